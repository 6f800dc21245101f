pub mod calendar;
pub mod date;
pub mod habit;
pub mod recurrence;
pub mod stats;
pub mod storage;
pub mod store;

pub use crate::store::{HabitStore, HabitStoreBuilder};
