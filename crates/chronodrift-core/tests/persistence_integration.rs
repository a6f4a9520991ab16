//! Snapshot persistence through SQLite and config files on disk.

use std::time::Duration;

use chronodrift_core::storage::Config;
use chronodrift_core::{AchievementId, ClockState, Database, TrackerStore};

#[test]
fn tracker_survives_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("chronodrift.db");
    let config = Config::default();

    let mut store = TrackerStore::new(&config);
    let keep = store.add_task("Keep me", None, 5, None);
    let done = store.add_task("Finish me", None, 1, None);
    store.complete_task(&done).unwrap();
    store.start_focus_session(&keep).unwrap();
    store.end_focus_session().unwrap();
    store.start_focus_session(&keep).unwrap();
    store.start_timer(Duration::from_secs(60));

    let db = Database::open_at(&db_path).unwrap();
    db.save_snapshot(&store.snapshot()).unwrap();
    drop(db);

    let snapshot = Database::open_at(&db_path)
        .unwrap()
        .load_snapshot()
        .unwrap()
        .expect("snapshot saved");
    let restored = TrackerStore::restore(snapshot, &config);

    assert_eq!(restored.tasks().len(), 2);
    assert_eq!(
        restored.tasks().iter().map(|t| t.title.as_str()).collect::<Vec<_>>(),
        vec!["Keep me", "Finish me"]
    );
    assert_eq!(restored.stats().total_tasks_completed, 1);
    assert_eq!(restored.sessions().len(), 1);
    assert!(restored.active_session().is_none());
    assert_eq!(restored.clock().state(), ClockState::Idle);
    assert!(restored.achievements().is_unlocked(AchievementId::FirstTask));
}

#[test]
fn config_controls_new_trackers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = Config::load_from(&path).unwrap();
    config.set("timer.default_minutes", "10").unwrap();
    config.set("tasks.procrastination_step", "50").unwrap();
    config.save_to(&path).unwrap();

    let config = Config::load_from(&path).unwrap();
    let mut store = TrackerStore::new(&config);
    assert_eq!(store.default_duration(), Duration::from_secs(600));
    assert_eq!(store.clock().remaining(), Duration::from_secs(600));

    let id = store.add_task("Fast runner", None, 3, None);
    store.procrastinate(&id).unwrap();
    store.procrastinate(&id).unwrap();
    assert!(store.task(&id).unwrap().is_terminal());
}
