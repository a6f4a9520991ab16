pub mod config;
pub mod focus;
pub mod stats;
pub mod task;

use std::sync::{Arc, Mutex};

use chronodrift_core::{Config, Database, Event, TrackerStore};

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Tracker restored from the database, plus what is needed to save it back.
pub struct Workspace {
    pub db: Database,
    pub config: Config,
    pub store: TrackerStore,
}

impl Workspace {
    pub fn open() -> CliResult<Self> {
        let config = Config::load()?;
        let db = Database::open()?;
        let store = match db.load_snapshot()? {
            Some(snapshot) => TrackerStore::restore(snapshot, &config),
            None => TrackerStore::new(&config),
        };
        Ok(Self { db, config, store })
    }

    pub fn save(&self) -> CliResult {
        self.db.save_snapshot(&self.store.snapshot())?;
        Ok(())
    }
}

pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Collects the events a command produces so they can be printed.
pub struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
    pub fn attach(store: &mut TrackerStore) -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        store.subscribe(move |event| {
            if let Ok(mut events) = sink.lock() {
                events.push(event.clone());
            }
        });
        Self(events)
    }

    pub fn take(&self) -> Vec<Event> {
        self.0
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }
}
