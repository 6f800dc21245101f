use std::fs;

use chrono::NaiveDate;
use tempfile::tempdir;

use habitflow_core::date::WeekStart;
use habitflow_core::habit::{Category, Habit};
use habitflow_core::recurrence::{self, Frequency};
use habitflow_core::storage::{DirectoryStorage, HABITS_RECORD};
use habitflow_core::HabitStore;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn store_state_survives_a_reload() {
    let temp = tempdir().expect("tempdir");
    let storage = DirectoryStorage::new(temp.path());

    {
        let mut store = HabitStore::builder().with_storage(storage.clone()).build();
        store.add_habit(
            Habit::new("h1", "Vitamins", Frequency::Daily, day(2024, 1, 1))
                .with_color("green")
                .with_category(Category::Health),
        );
        store.add_habit(Habit::new(
            "h2",
            "Gym",
            Frequency::Specific {
                days_of_week: [1, 3, 5].into_iter().collect(),
            },
            day(2024, 1, 1),
        ));
        store.toggle_completion("h1", "2024-03-05");
        store.add_exception("h2", "2024-03-06");
        store.stop_from_date("h1", "2024-03-10");
        store.set_week_start(WeekStart::Sunday);
    }

    let store = HabitStore::builder().with_storage(storage).build();
    assert_eq!(store.habits().len(), 2);
    assert_eq!(store.week_start(), WeekStart::Sunday);
    assert!(store.is_completed("h1", "2024-03-05"));

    let vitamins = store.habit("h1").expect("h1 reloaded");
    assert_eq!(vitamins.end_date, Some(day(2024, 3, 9)));
    assert_eq!(vitamins.category, Category::Health);

    let gym = store.habit("h2").expect("h2 reloaded");
    assert!(gym.exceptions.contains("2024-03-06"));
    assert!(!recurrence::is_due(gym, day(2024, 3, 6)));
}

#[test]
fn corrupt_record_falls_back_to_an_empty_store() {
    let temp = tempdir().expect("tempdir");
    fs::write(
        temp.path().join(format!("{HABITS_RECORD}.json")),
        "{definitely not json",
    )
    .expect("write corrupt record");

    let store = HabitStore::builder()
        .with_storage(DirectoryStorage::new(temp.path()))
        .build();
    assert!(store.habits().is_empty());
    assert_eq!(store.week_start(), WeekStart::Monday);
}

#[test]
fn persisted_habits_use_the_original_record_shape() {
    let temp = tempdir().expect("tempdir");

    {
        let mut store = HabitStore::builder()
            .with_storage(DirectoryStorage::new(temp.path()))
            .build();
        store.add_habit(Habit::new("h1", "English", Frequency::Weekdays, day(2024, 2, 1)));
    }

    let raw = fs::read_to_string(temp.path().join(format!("{HABITS_RECORD}.json")))
        .expect("habits record written");
    assert!(raw.contains(r#""startDate":"2024-02-01""#));
    assert!(raw.contains(r#""type":"weekdays""#));
}
