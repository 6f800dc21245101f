use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// First day of the calendar week, as chosen in the user's settings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum WeekStart {
    Sunday,
    #[default]
    Monday,
}

pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Canonical `YYYY-MM-DD` key for a calendar day.
///
/// Every "same day" comparison in the engine goes through this key, never
/// through timestamp equality. The key sorts lexicographically in calendar
/// order, which the week-window filters rely on.
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, DATE_KEY_FORMAT).ok()
}

/// The local calendar day, truncated from wall-clock time.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Inclusive 7-day window containing `date`.
///
/// With a Monday start a Sunday maps to the Monday six days earlier; with a
/// Sunday start a Sunday maps to itself.
pub fn week_range(date: NaiveDate, week_start: WeekStart) -> (NaiveDate, NaiveDate) {
    let dow = i64::from(date.weekday().num_days_from_sunday());
    let back = match week_start {
        WeekStart::Monday => (dow + 6) % 7,
        WeekStart::Sunday => dow,
    };
    let start = date - Duration::days(back);
    (start, start + Duration::days(6))
}
