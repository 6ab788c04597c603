use chrono::{NaiveDate, TimeZone, Utc};
use dayplan_core::db::{open_db, open_db_in_memory};
use dayplan_core::{FixedClock, Habit, HabitTracker, KvStore, SqliteKvStore, Task};

#[test]
fn sqlite_store_round_trips_typed_documents() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKvStore::new(&conn);

    let start = Utc.with_ymd_and_hms(2025, 2, 1, 9, 15, 0).unwrap();
    let mut habit = Habit::new(1, "Read", 3, start, "#4b6cb7");
    habit.progress[0] = true;
    let habits = vec![habit];

    store.save("habits", &habits).unwrap();
    let loaded: Vec<Habit> = store.load("habits").unwrap();
    assert_eq!(loaded, habits);
    assert_eq!(loaded[0].start_day(), NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
}

#[test]
fn sqlite_store_upserts_and_removes() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKvStore::new(&conn);

    store.set_raw("tags", "[]").unwrap();
    store.set_raw("tags", r##"[{"name":"Urgent","color":"#f44336"}]"##).unwrap();
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM kv_entries;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
    assert_eq!(store.keys().unwrap(), vec!["tags".to_string()]);

    store.remove("tags").unwrap();
    assert_eq!(store.get_raw("tags").unwrap(), None);
}

#[test]
fn corrupted_documents_load_as_absent() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKvStore::new(&conn);

    store.set_raw("tasks", "[{\"id\": \"not a number\"}]").unwrap();
    assert_eq!(store.load::<Vec<Task>>("tasks"), None);
    assert!(store.load_or::<Vec<Task>>("tasks", Vec::new()).is_empty());
}

#[test]
fn corrupted_habits_start_an_empty_session() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKvStore::new(&conn);
    store.set_raw("habits", "{ definitely not json").unwrap();

    let clock = FixedClock::at_date(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
    let mut tracker = HabitTracker::open(&store, clock);
    assert!(tracker.list().is_empty());

    tracker.create("Read", 2, "").unwrap();
    let reloaded: Vec<Habit> = store.load("habits").unwrap();
    assert_eq!(reloaded.len(), 1);
}

#[test]
fn documents_survive_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dayplan.sqlite3");

    {
        let conn = open_db(&path).unwrap();
        SqliteKvStore::new(&conn)
            .save("categories", &["Work", "Errands"])
            .unwrap();
    }

    let conn = open_db(&path).unwrap();
    let categories: Vec<String> = SqliteKvStore::new(&conn).load("categories").unwrap();
    assert_eq!(categories, vec!["Work", "Errands"]);
}
