use std::collections::BTreeSet;

use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::recurrence::Frequency;

/// Grouping label shown next to a habit. Presentation metadata only; the
/// recurrence logic never looks at it.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Health,
    Work,
    Sport,
    #[default]
    General,
}

/// A recurring task definition. `id` is opaque and immutable once created;
/// `end_date` is only ever set by [`crate::store::HabitStore::stop_from_date`],
/// which derives it one day before the cutoff, so `start_date <= end_date`
/// holds by construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub category: Category,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub exceptions: BTreeSet<String>,
    #[serde(default)]
    pub archived: bool,
}

fn default_color() -> String {
    "slate".to_string()
}

impl Habit {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        frequency: Frequency,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: default_color(),
            category: Category::default(),
            frequency,
            start_date,
            end_date: None,
            exceptions: BTreeSet::new(),
            archived: false,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// A `Specific` habit with no days selected can never be due; stats
    /// treat it as inactive.
    pub fn is_active(&self) -> bool {
        match &self.frequency {
            Frequency::Specific { days_of_week } => !days_of_week.is_empty(),
            _ => true,
        }
    }
}

/// Pre-validation for habit creation. The store itself does not re-check
/// these rules; callers that bypass this produce degenerate habits, not
/// crashes.
pub fn validate(name: &str, frequency: &Frequency) -> Result<()> {
    anyhow::ensure!(!name.trim().is_empty(), "habit name must not be empty");
    if let Frequency::Specific { days_of_week } = frequency {
        anyhow::ensure!(
            !days_of_week.is_empty(),
            "specific-day habits need at least one day of the week"
        );
        anyhow::ensure!(
            days_of_week.iter().all(|day| *day <= 6),
            "days of the week must be in 0..=6 (0 = Sunday)"
        );
    }
    Ok(())
}
