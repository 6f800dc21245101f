use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::date::{self, WeekStart};
use crate::habit::Habit;
use crate::store::CompletionLedger;

/// Reporting window, anchored to a caller-supplied reference day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    Week,
    Month,
    Year,
}

/// Folds the ledger into per-habit completion counts for the window
/// containing `today`.
///
/// The week window compares date keys as strings against the boundary keys
/// of [`date::week_range`]; month and year windows parse the key and compare
/// calendar fields. Inactive habits are excluded from the result; every
/// active habit appears, with an explicit 0 when nothing was completed.
pub fn completion_counts(
    habits: &[Habit],
    ledger: &CompletionLedger,
    window: TimeWindow,
    today: NaiveDate,
    week_start: WeekStart,
) -> BTreeMap<String, u64> {
    let mut counts: BTreeMap<String, u64> = habits
        .iter()
        .filter(|habit| habit.is_active())
        .map(|habit| (habit.id.clone(), 0))
        .collect();

    let (week_from, week_to) = date::week_range(today, week_start);
    let (week_from, week_to) = (date::date_key(week_from), date::date_key(week_to));

    for (key, day) in ledger {
        let included = match window {
            TimeWindow::Week => *key >= week_from && *key <= week_to,
            TimeWindow::Month => date::parse_date_key(key)
                .is_some_and(|d| d.year() == today.year() && d.month() == today.month()),
            TimeWindow::Year => {
                date::parse_date_key(key).is_some_and(|d| d.year() == today.year())
            }
        };
        if !included {
            continue;
        }
        for (habit_id, completed) in day {
            if !completed {
                continue;
            }
            if let Some(count) = counts.get_mut(habit_id) {
                *count += 1;
            }
        }
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::Frequency;
    use std::collections::BTreeSet;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn mark(ledger: &mut CompletionLedger, date_key: &str, habit_id: &str, done: bool) {
        ledger
            .entry(date_key.to_string())
            .or_default()
            .insert(habit_id.to_string(), done);
    }

    fn daily(id: &str) -> Habit {
        Habit::new(id, id.to_uppercase(), Frequency::Daily, day(2024, 1, 1))
    }

    #[test]
    fn month_window_filters_by_calendar_month() {
        let habits = vec![daily("h1")];
        let mut ledger = CompletionLedger::new();
        mark(&mut ledger, "2024-02-01", "h1", true);
        mark(&mut ledger, "2024-03-01", "h1", true);

        let counts = completion_counts(
            &habits,
            &ledger,
            TimeWindow::Month,
            day(2024, 2, 15),
            WeekStart::Monday,
        );
        assert_eq!(counts.get("h1"), Some(&1));
    }

    #[test]
    fn year_window_spans_all_months() {
        let habits = vec![daily("h1")];
        let mut ledger = CompletionLedger::new();
        mark(&mut ledger, "2024-02-01", "h1", true);
        mark(&mut ledger, "2024-03-01", "h1", true);
        mark(&mut ledger, "2023-12-31", "h1", true);

        let counts = completion_counts(
            &habits,
            &ledger,
            TimeWindow::Year,
            day(2024, 2, 15),
            WeekStart::Monday,
        );
        assert_eq!(counts.get("h1"), Some(&2));
    }

    #[test]
    fn week_window_uses_string_range_on_boundary_keys() {
        let habits = vec![daily("h1")];
        let mut ledger = CompletionLedger::new();
        // Week of 2024-03-06 (Wednesday), Monday start: 03-04..03-10.
        mark(&mut ledger, "2024-03-04", "h1", true);
        mark(&mut ledger, "2024-03-10", "h1", true);
        mark(&mut ledger, "2024-03-11", "h1", true);
        mark(&mut ledger, "2024-03-03", "h1", true);

        let counts = completion_counts(
            &habits,
            &ledger,
            TimeWindow::Week,
            day(2024, 3, 6),
            WeekStart::Monday,
        );
        assert_eq!(counts.get("h1"), Some(&2));
    }

    #[test]
    fn explicit_false_flags_do_not_count() {
        let habits = vec![daily("h1")];
        let mut ledger = CompletionLedger::new();
        mark(&mut ledger, "2024-02-01", "h1", false);

        let counts = completion_counts(
            &habits,
            &ledger,
            TimeWindow::Month,
            day(2024, 2, 15),
            WeekStart::Monday,
        );
        assert_eq!(counts.get("h1"), Some(&0));
    }

    #[test]
    fn inactive_habits_are_excluded_even_with_stray_completions() {
        let inactive = Habit::new(
            "h2",
            "Empty",
            Frequency::Specific {
                days_of_week: BTreeSet::new(),
            },
            day(2024, 1, 1),
        );
        let habits = vec![daily("h1"), inactive];
        let mut ledger = CompletionLedger::new();
        mark(&mut ledger, "2024-02-01", "h2", true);

        let counts = completion_counts(
            &habits,
            &ledger,
            TimeWindow::Month,
            day(2024, 2, 15),
            WeekStart::Monday,
        );
        assert!(!counts.contains_key("h2"));
        assert_eq!(counts.get("h1"), Some(&0));
    }

    #[test]
    fn orphaned_completions_for_deleted_habits_are_ignored() {
        let habits = vec![daily("h1")];
        let mut ledger = CompletionLedger::new();
        mark(&mut ledger, "2024-02-01", "gone", true);

        let counts = completion_counts(
            &habits,
            &ledger,
            TimeWindow::Month,
            day(2024, 2, 15),
            WeekStart::Monday,
        );
        assert!(!counts.contains_key("gone"));
    }
}
