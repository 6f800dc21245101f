use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::date::{self, WeekStart};

/// A month view is always 6 rows of 7 so the grid height never jumps
/// between months.
pub const MONTH_GRID_CELLS: usize = 42;

/// One grid cell. Recomputed on every view request, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub date_key: String,
    pub is_current_month: bool,
    pub is_today: bool,
}

fn cell(date: NaiveDate, is_current_month: bool, today: NaiveDate) -> CalendarDay {
    CalendarDay {
        date,
        date_key: date::date_key(date),
        is_current_month,
        is_today: date == today,
    }
}

/// Leading cells needed so the first of the month lands in the right column.
fn leading_padding(first: NaiveDate, week_start: WeekStart) -> i64 {
    let dow = i64::from(first.weekday().num_days_from_sunday());
    match week_start {
        WeekStart::Monday => (dow + 6) % 7,
        WeekStart::Sunday => dow,
    }
}

/// The 42-cell grid for `month` of `year` (1..=12). Padding cells from the
/// adjacent months carry `is_current_month = false`.
pub fn month_grid(year: i32, month: u32, week_start: WeekStart) -> Vec<CalendarDay> {
    month_grid_at(year, month, week_start, date::today())
}

pub fn month_grid_at(
    year: i32,
    month: u32,
    week_start: WeekStart,
    today: NaiveDate,
) -> Vec<CalendarDay> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        warn!(year, month, "ignoring month grid request for invalid month");
        return Vec::new();
    };
    let grid_start = first - Duration::days(leading_padding(first, week_start));
    (0..MONTH_GRID_CELLS as i64)
        .map(|offset| {
            let date = grid_start + Duration::days(offset);
            let in_month = date.year() == year && date.month() == month;
            cell(date, in_month, today)
        })
        .collect()
}

/// The 7-cell week containing `reference`. `is_current_month` is judged
/// against the reference date's month, so spill-over days dim correctly.
pub fn week_grid(reference: NaiveDate, week_start: WeekStart) -> Vec<CalendarDay> {
    week_grid_at(reference, week_start, date::today())
}

pub fn week_grid_at(
    reference: NaiveDate,
    week_start: WeekStart,
    today: NaiveDate,
) -> Vec<CalendarDay> {
    let (start, _) = date::week_range(reference, week_start);
    (0..7)
        .map(|offset| {
            let date = start + Duration::days(offset);
            let in_month = date.year() == reference.year() && date.month() == reference.month();
            cell(date, in_month, today)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_grid_is_always_42_cells() {
        let today = day(2024, 2, 10);
        for month in 1..=12 {
            assert_eq!(
                month_grid_at(2024, month, WeekStart::Monday, today).len(),
                MONTH_GRID_CELLS
            );
            assert_eq!(
                month_grid_at(2024, month, WeekStart::Sunday, today).len(),
                MONTH_GRID_CELLS
            );
        }
    }

    #[test]
    fn february_2024_monday_start_has_three_leading_pad_days() {
        // February 2024 starts on a Thursday.
        let grid = month_grid_at(2024, 2, WeekStart::Monday, day(2024, 2, 10));
        assert!(!grid[0].is_current_month);
        assert_eq!(grid[0].date, day(2024, 1, 29));
        assert!(!grid[2].is_current_month);
        assert!(grid[3].is_current_month);
        assert_eq!(grid[3].date, day(2024, 2, 1));
    }

    #[test]
    fn sunday_start_pads_by_the_weekday_index() {
        // February 2024 starts on a Thursday, weekday index 4 from Sunday.
        let grid = month_grid_at(2024, 2, WeekStart::Sunday, day(2024, 2, 10));
        assert_eq!(grid[4].date, day(2024, 2, 1));
        assert!(grid[4].is_current_month);
    }

    #[test]
    fn month_starting_on_week_start_has_no_leading_padding() {
        // 2024-01-01 is a Monday.
        let grid = month_grid_at(2024, 1, WeekStart::Monday, day(2024, 2, 10));
        assert_eq!(grid[0].date, day(2024, 1, 1));
        assert!(grid[0].is_current_month);
    }

    #[test]
    fn trailing_cells_come_from_the_next_month() {
        let grid = month_grid_at(2024, 2, WeekStart::Monday, day(2024, 2, 10));
        let last = grid.last().unwrap();
        assert!(!last.is_current_month);
        assert_eq!(last.date, day(2024, 3, 10));
    }

    #[test]
    fn today_flag_matches_the_anchor_day() {
        let grid = month_grid_at(2024, 2, WeekStart::Monday, day(2024, 2, 10));
        let todays: Vec<_> = grid.iter().filter(|c| c.is_today).collect();
        assert_eq!(todays.len(), 1);
        assert_eq!(todays[0].date_key, "2024-02-10");
    }

    #[test]
    fn invalid_month_yields_an_empty_grid() {
        assert!(month_grid_at(2024, 13, WeekStart::Monday, day(2024, 2, 10)).is_empty());
    }

    #[test]
    fn week_grid_has_seven_cells_and_dims_spillover() {
        // Week of Friday 2024-03-01 reaches back into February.
        let grid = week_grid_at(day(2024, 3, 1), WeekStart::Monday, day(2024, 3, 1));
        assert_eq!(grid.len(), 7);
        assert_eq!(grid[0].date, day(2024, 2, 26));
        assert!(!grid[0].is_current_month);
        assert!(grid[4].is_current_month);
        assert!(grid[4].is_today);
    }
}
