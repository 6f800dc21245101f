use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::date;
use crate::habit::Habit;

/// How often a habit recurs. Day-of-week numbers are 0=Sunday..6=Saturday,
/// matching the persisted records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekdays,
    Weekends,
    Specific {
        #[serde(rename = "daysOfWeek", default)]
        days_of_week: BTreeSet<u8>,
    },
    Monthly,
}

/// Whether `habit` should appear on `date`. Pure; the first matching rule
/// wins: exception, end date, start date, archived, then the frequency.
pub fn is_due(habit: &Habit, date: NaiveDate) -> bool {
    if habit.exceptions.contains(&date::date_key(date)) {
        return false;
    }
    if let Some(end) = habit.end_date {
        if date > end {
            return false;
        }
    }
    if date < habit.start_date {
        return false;
    }
    if habit.archived {
        return false;
    }

    let dow = date.weekday().num_days_from_sunday() as u8;
    match &habit.frequency {
        Frequency::Daily => true,
        Frequency::Weekdays => (1..=5).contains(&dow),
        Frequency::Weekends => dow == 0 || dow == 6,
        Frequency::Specific { days_of_week } => days_of_week.contains(&dow),
        // No day-of-month rule exists yet, so monthly habits surface daily.
        Frequency::Monthly => true,
    }
}
