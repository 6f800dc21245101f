use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::date::{self, WeekStart};
use crate::habit::Habit;
use crate::recurrence;
use crate::stats::{self, TimeWindow};
use crate::storage::{
    MemoryStorage, StorageBackend, COMPLETIONS_RECORD, HABITS_RECORD, SETTINGS_RECORD,
};

/// Date key -> habit id -> completed flag. Entries are created lazily; a
/// missing entry reads the same as an explicit `false`.
pub type CompletionLedger = BTreeMap<String, BTreeMap<String, bool>>;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub start_day_of_week: WeekStart,
}

/// Owns the habit list, the completion ledger, and the week-start setting.
///
/// Mutations take `&mut self`, so a single logical thread of control is a
/// compile-time fact; wrap the store in a lock before sharing it. Every
/// successful mutation persists the affected record fire-and-forget: a
/// failed write logs a warning and the in-memory state stands.
pub struct HabitStore {
    habits: Vec<Habit>,
    completions: CompletionLedger,
    settings: Settings,
    storage: Box<dyn StorageBackend>,
}

pub struct HabitStoreBuilder {
    storage: Option<Box<dyn StorageBackend>>,
}

impl HabitStoreBuilder {
    pub fn new() -> Self {
        Self { storage: None }
    }

    pub fn with_storage(mut self, storage: impl StorageBackend + 'static) -> Self {
        self.storage = Some(Box::new(storage));
        self
    }

    /// Loads all three records. Missing or malformed records fall back to
    /// empty defaults so the store always starts usable.
    pub fn build(self) -> HabitStore {
        let storage = self
            .storage
            .unwrap_or_else(|| Box::new(MemoryStorage::new()));
        let habits = load_record(storage.as_ref(), HABITS_RECORD);
        let completions = load_record(storage.as_ref(), COMPLETIONS_RECORD);
        let settings = load_record(storage.as_ref(), SETTINGS_RECORD);
        HabitStore {
            habits,
            completions,
            settings,
            storage,
        }
    }
}

impl Default for HabitStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn load_record<T: DeserializeOwned + Default>(storage: &dyn StorageBackend, record: &str) -> T {
    let payload = match storage.read(record) {
        Ok(Some(payload)) => payload,
        Ok(None) => return T::default(),
        Err(err) => {
            warn!(record, %err, "failed to read record, starting empty");
            return T::default();
        }
    };
    match serde_json::from_str(&payload) {
        Ok(value) => value,
        Err(err) => {
            warn!(record, %err, "malformed record, starting empty");
            T::default()
        }
    }
}

impl HabitStore {
    pub fn builder() -> HabitStoreBuilder {
        HabitStoreBuilder::new()
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn habit(&self, id: &str) -> Option<&Habit> {
        self.habits.iter().find(|habit| habit.id == id)
    }

    pub fn completions(&self) -> &CompletionLedger {
        &self.completions
    }

    pub fn week_start(&self) -> WeekStart {
        self.settings.start_day_of_week
    }

    pub fn is_completed(&self, habit_id: &str, date_key: &str) -> bool {
        self.completions
            .get(date_key)
            .and_then(|day| day.get(habit_id))
            .copied()
            .unwrap_or(false)
    }

    /// Habits due on `date`, in insertion order.
    pub fn due_on(&self, date: NaiveDate) -> Vec<&Habit> {
        self.habits
            .iter()
            .filter(|habit| recurrence::is_due(habit, date))
            .collect()
    }

    /// Completion counts for the window anchored to the current day.
    /// Inactive habits are excluded from the result.
    pub fn stats(&self, window: TimeWindow) -> BTreeMap<String, u64> {
        stats::completion_counts(
            &self.habits,
            &self.completions,
            window,
            date::today(),
            self.week_start(),
        )
    }

    /// Appends a habit. The caller guarantees id uniqueness and has already
    /// validated the definition.
    pub fn add_habit(&mut self, habit: Habit) {
        debug!(id = %habit.id, name = %habit.name, "adding habit");
        self.habits.push(habit);
        self.persist_habits();
    }

    /// Replaces the habit with the same id. Unknown ids are ignored.
    pub fn update_habit(&mut self, updated: Habit) {
        let Some(slot) = self.habits.iter_mut().find(|h| h.id == updated.id) else {
            return;
        };
        *slot = updated;
        self.persist_habits();
    }

    /// Removes the habit entirely. Historical completions stay in the
    /// ledger; stats filter them out once the habit is gone.
    pub fn delete_habit(&mut self, id: &str) {
        let before = self.habits.len();
        self.habits.retain(|habit| habit.id != id);
        if self.habits.len() == before {
            return;
        }
        debug!(id, "deleted habit");
        self.persist_habits();
    }

    /// Flips the completed flag for `(habit_id, date_key)`, treating an
    /// absent entry as `false`. Unknown habit ids are ignored.
    pub fn toggle_completion(&mut self, habit_id: &str, date_key: &str) {
        if self.habit(habit_id).is_none() {
            return;
        }
        let day = self.completions.entry(date_key.to_string()).or_default();
        let flag = day.entry(habit_id.to_string()).or_insert(false);
        *flag = !*flag;
        debug!(habit_id, date_key, completed = *flag, "toggled completion");
        self.persist_completions();
    }

    /// Suppresses the habit on a single day. Idempotent. Any recorded
    /// completion for that day is scrubbed so it cannot resurface for a day
    /// the habit is no longer due on.
    pub fn add_exception(&mut self, habit_id: &str, date_key: &str) {
        let Some(habit) = self.habits.iter_mut().find(|h| h.id == habit_id) else {
            return;
        };
        let inserted = habit.exceptions.insert(date_key.to_string());

        let mut scrubbed = false;
        if let Some(day) = self.completions.get_mut(date_key) {
            scrubbed = day.remove(habit_id).is_some();
            if day.is_empty() {
                self.completions.remove(date_key);
            }
        }

        if inserted {
            self.persist_habits();
        }
        if scrubbed {
            self.persist_completions();
        }
    }

    /// Ends the habit the day before `cutoff_key`. Calendar-day arithmetic,
    /// so month and year boundaries roll correctly. Completions recorded
    /// before the cutoff remain valid history.
    pub fn stop_from_date(&mut self, habit_id: &str, cutoff_key: &str) {
        let Some(cutoff) = date::parse_date_key(cutoff_key) else {
            warn!(habit_id, cutoff_key, "ignoring stop request with malformed date key");
            return;
        };
        let Some(habit) = self.habits.iter_mut().find(|h| h.id == habit_id) else {
            return;
        };
        habit.end_date = Some(cutoff - Duration::days(1));
        self.persist_habits();
    }

    pub fn set_week_start(&mut self, week_start: WeekStart) {
        self.settings.start_day_of_week = week_start;
        self.persist(SETTINGS_RECORD, &self.settings);
    }

    fn persist_habits(&self) {
        self.persist(HABITS_RECORD, &self.habits);
    }

    fn persist_completions(&self) {
        self.persist(COMPLETIONS_RECORD, &self.completions);
    }

    fn persist<T: Serialize>(&self, record: &str, value: &T) {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(record, %err, "failed to serialize record");
                return;
            }
        };
        if let Err(err) = self.storage.write(record, &payload) {
            warn!(record, %err, "failed to persist record");
        }
    }
}
