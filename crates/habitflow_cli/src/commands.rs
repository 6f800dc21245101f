use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use clap::{Args, ValueEnum};
use uuid::Uuid;

use habitflow_core::calendar::{self, CalendarDay};
use habitflow_core::date::{self, WeekStart};
use habitflow_core::habit::{self, Category, Habit};
use habitflow_core::recurrence::Frequency;
use habitflow_core::stats::TimeWindow;
use habitflow_core::storage::DirectoryStorage;
use habitflow_core::HabitStore;

pub fn open_store(data_dir: &Path) -> HabitStore {
    tracing::debug!(path = %data_dir.display(), "opening store");
    HabitStore::builder()
        .with_storage(DirectoryStorage::new(data_dir))
        .build()
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FrequencyArg {
    Daily,
    Weekdays,
    Weekends,
    Specific,
    Monthly,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CategoryArg {
    Health,
    Work,
    Sport,
    General,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Health => Category::Health,
            CategoryArg::Work => Category::Work,
            CategoryArg::Sport => Category::Sport,
            CategoryArg::General => Category::General,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum WindowArg {
    Week,
    Month,
    Year,
}

impl From<WindowArg> for TimeWindow {
    fn from(arg: WindowArg) -> Self {
        match arg {
            WindowArg::Week => TimeWindow::Week,
            WindowArg::Month => TimeWindow::Month,
            WindowArg::Year => TimeWindow::Year,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum WeekStartArg {
    Sunday,
    Monday,
}

impl From<WeekStartArg> for WeekStart {
    fn from(arg: WeekStartArg) -> Self {
        match arg {
            WeekStartArg::Sunday => WeekStart::Sunday,
            WeekStartArg::Monday => WeekStart::Monday,
        }
    }
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Display name
    pub name: String,

    #[arg(long, value_enum, default_value = "daily")]
    pub frequency: FrequencyArg,

    /// Comma-separated day numbers for `--frequency specific` (0 = Sunday)
    #[arg(long)]
    pub days: Option<String>,

    #[arg(long, default_value = "slate")]
    pub color: String,

    #[arg(long, value_enum, default_value = "general")]
    pub category: CategoryArg,

    /// Start date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub start: Option<String>,
}

pub fn add(store: &mut HabitStore, args: AddArgs) -> Result<()> {
    let frequency = parse_frequency(args.frequency, args.days.as_deref())?;
    habit::validate(&args.name, &frequency)?;
    let start = parse_optional_date(args.start.as_deref())?;

    let habit = Habit::new(Uuid::new_v4().to_string(), args.name, frequency, start)
        .with_color(args.color)
        .with_category(args.category.into());
    println!("added {} ({})", habit.name, habit.id);
    store.add_habit(habit);
    Ok(())
}

pub fn list(store: &HabitStore) -> Result<()> {
    if store.habits().is_empty() {
        println!("no habits yet");
        return Ok(());
    }
    for habit in store.habits() {
        let mut line = format!(
            "{}  {}  {}  from {}",
            habit.id,
            habit.name,
            describe_frequency(&habit.frequency),
            date::date_key(habit.start_date)
        );
        if let Some(end) = habit.end_date {
            line.push_str(&format!(" until {}", date::date_key(end)));
        }
        if habit.archived {
            line.push_str("  (archived)");
        }
        println!("{line}");
    }
    Ok(())
}

pub fn due(store: &HabitStore, date_arg: Option<&str>) -> Result<()> {
    let date = parse_optional_date(date_arg)?;
    let key = date::date_key(date);
    let due = store.due_on(date);
    if due.is_empty() {
        println!("nothing due on {key}");
        return Ok(());
    }
    for habit in due {
        let done = if store.is_completed(&habit.id, &key) {
            "x"
        } else {
            " "
        };
        println!("[{done}] {}  ({})", habit.name, habit.id);
    }
    Ok(())
}

pub fn toggle(store: &mut HabitStore, id: &str, date_arg: Option<&str>) -> Result<()> {
    require_habit(store, id)?;
    let key = date::date_key(parse_optional_date(date_arg)?);
    store.toggle_completion(id, &key);
    let state = if store.is_completed(id, &key) {
        "completed"
    } else {
        "not completed"
    };
    println!("{key}: {state}");
    Ok(())
}

pub fn skip(store: &mut HabitStore, id: &str, date_arg: &str) -> Result<()> {
    require_habit(store, id)?;
    let key = date::date_key(parse_date(date_arg)?);
    store.add_exception(id, &key);
    println!("skipping on {key}");
    Ok(())
}

pub fn stop(store: &mut HabitStore, id: &str, from_arg: &str) -> Result<()> {
    require_habit(store, id)?;
    let key = date::date_key(parse_date(from_arg)?);
    store.stop_from_date(id, &key);
    if let Some(end) = store.habit(id).and_then(|h| h.end_date) {
        println!("stopped, last day is {}", date::date_key(end));
    }
    Ok(())
}

pub fn delete(store: &mut HabitStore, id: &str) -> Result<()> {
    require_habit(store, id)?;
    store.delete_habit(id);
    println!("deleted {id}");
    Ok(())
}

pub fn month(store: &HabitStore, year: Option<i32>, month: Option<u32>) -> Result<()> {
    let today = date::today();
    let year = year.unwrap_or_else(|| today.year());
    let month = month.unwrap_or_else(|| today.month());
    anyhow::ensure!((1..=12).contains(&month), "month must be 1..=12");

    let grid = calendar::month_grid(year, month, store.week_start());
    println!("{year}-{month:02}");
    println!("{}", weekday_header(store.week_start()));
    for row in grid.chunks(7) {
        let line: String = row.iter().map(format_cell).collect();
        println!("{line}");
    }
    Ok(())
}

pub fn week(store: &HabitStore, date_arg: Option<&str>) -> Result<()> {
    let reference = parse_optional_date(date_arg)?;
    for cell in calendar::week_grid(reference, store.week_start()) {
        let marker = if cell.is_today { '*' } else { ' ' };
        let entries: Vec<String> = store
            .due_on(cell.date)
            .iter()
            .map(|habit| {
                let done = if store.is_completed(&habit.id, &cell.date_key) {
                    "x"
                } else {
                    " "
                };
                format!("[{done}] {}", habit.name)
            })
            .collect();
        println!(
            "{marker}{} {}  {}",
            cell.date_key,
            cell.date.format("%a"),
            entries.join("  ")
        );
    }
    Ok(())
}

pub fn stats(store: &HabitStore, window: WindowArg) -> Result<()> {
    let counts = store.stats(window.into());
    let named: BTreeMap<String, u64> = counts
        .into_iter()
        .map(|(id, count)| {
            let name = store
                .habit(&id)
                .map(|habit| habit.name.clone())
                .unwrap_or(id);
            (name, count)
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&named)?);
    Ok(())
}

pub fn week_start(store: &mut HabitStore, value: WeekStartArg) -> Result<()> {
    store.set_week_start(value.into());
    println!("week starts on {value:?}");
    Ok(())
}

fn require_habit(store: &HabitStore, id: &str) -> Result<()> {
    anyhow::ensure!(store.habit(id).is_some(), "no habit with id `{id}`");
    Ok(())
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    date::parse_date_key(raw).with_context(|| format!("`{raw}` is not a YYYY-MM-DD date"))
}

fn parse_optional_date(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        Some(raw) => parse_date(raw),
        None => Ok(date::today()),
    }
}

fn parse_frequency(kind: FrequencyArg, days: Option<&str>) -> Result<Frequency> {
    match kind {
        FrequencyArg::Daily => Ok(Frequency::Daily),
        FrequencyArg::Weekdays => Ok(Frequency::Weekdays),
        FrequencyArg::Weekends => Ok(Frequency::Weekends),
        FrequencyArg::Monthly => Ok(Frequency::Monthly),
        FrequencyArg::Specific => {
            let raw = days.context("--frequency specific needs --days, e.g. --days 1,3,5")?;
            let mut days_of_week = BTreeSet::new();
            for part in raw.split(',') {
                let day: u8 = part
                    .trim()
                    .parse()
                    .with_context(|| format!("`{part}` is not a day number"))?;
                anyhow::ensure!(day <= 6, "day numbers are 0..=6 (0 = Sunday)");
                days_of_week.insert(day);
            }
            Ok(Frequency::Specific { days_of_week })
        }
    }
}

const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

fn describe_frequency(frequency: &Frequency) -> String {
    match frequency {
        Frequency::Daily => "daily".to_string(),
        Frequency::Weekdays => "weekdays".to_string(),
        Frequency::Weekends => "weekends".to_string(),
        Frequency::Monthly => "monthly".to_string(),
        Frequency::Specific { days_of_week } => {
            let days: Vec<&str> = days_of_week
                .iter()
                .map(|day| WEEKDAY_NAMES[*day as usize % 7])
                .collect();
            format!("on {}", days.join(","))
        }
    }
}

fn weekday_header(week_start: WeekStart) -> String {
    let order: Vec<&str> = match week_start {
        WeekStart::Sunday => WEEKDAY_NAMES.to_vec(),
        WeekStart::Monday => WEEKDAY_NAMES[1..]
            .iter()
            .chain(&WEEKDAY_NAMES[..1])
            .copied()
            .collect(),
    };
    order.iter().map(|name| format!("{name:>4}")).collect()
}

fn format_cell(cell: &CalendarDay) -> String {
    let day = cell.date.day();
    if cell.is_today {
        format!("[{day:>2}]")
    } else if cell.is_current_month {
        format!(" {day:>2} ")
    } else {
        "   .".to_string()
    }
}
