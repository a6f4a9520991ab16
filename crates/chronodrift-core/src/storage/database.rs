//! SQLite-backed tracker persistence.
//!
//! Provides persistent storage for:
//! - The tracker snapshot (tasks, closed sessions, stats, achievements)
//! - Key-value store for application state

use std::path::Path;

use rusqlite::{params, Connection};
use tracing::debug;

use super::data_dir;
use crate::error::{DatabaseError, Result};
use crate::store::TrackerSnapshot;

const SNAPSHOT_KEY: &str = "tracker_snapshot";

/// SQLite database holding the tracker snapshot.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data dir>/chronodrift.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory is unavailable or the
    /// database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("chronodrift.db");
        Self::open_at(&path)
    }

    /// Open (or create) a database file at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> std::result::Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> std::result::Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> std::result::Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Persist the snapshot, replacing any previous one.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save_snapshot(&self, snapshot: &TrackerSnapshot) -> Result<()> {
        let json = serde_json::to_string(snapshot)?;
        self.kv_set(SNAPSHOT_KEY, &json)?;
        debug!(
            tasks = snapshot.tasks.len(),
            sessions = snapshot.focus_sessions.len(),
            "snapshot saved"
        );
        Ok(())
    }

    /// Load the last saved snapshot, if any.
    ///
    /// # Errors
    /// Returns [`DatabaseError::CorruptSnapshot`] if the stored JSON does not
    /// decode, or a query error.
    pub fn load_snapshot(&self) -> Result<Option<TrackerSnapshot>> {
        let Some(json) = self.kv_get(SNAPSHOT_KEY)? else {
            return Ok(None);
        };
        let snapshot = serde_json::from_str(&json)
            .map_err(|e| DatabaseError::CorruptSnapshot(e.to_string()))?;
        Ok(Some(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_set("test", "again").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "again");
    }

    #[test]
    fn empty_database_has_no_snapshot() {
        let db = Database::open_memory().unwrap();
        assert!(db.load_snapshot().unwrap().is_none());
    }

    #[test]
    fn corrupt_snapshot_is_reported() {
        let db = Database::open_memory().unwrap();
        db.kv_set(SNAPSHOT_KEY, "{not json").unwrap();
        assert!(matches!(
            db.load_snapshot(),
            Err(CoreError::Database(DatabaseError::CorruptSnapshot(_)))
        ));
    }

    #[test]
    fn snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chronodrift.db");

        let snapshot = TrackerSnapshot::default();
        Database::open_at(&path).unwrap().save_snapshot(&snapshot).unwrap();

        let loaded = Database::open_at(&path).unwrap().load_snapshot().unwrap();
        assert_eq!(loaded, Some(snapshot));
    }

    #[test]
    fn open_at_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("chronodrift.db");
        assert!(matches!(
            Database::open_at(&path),
            Err(CoreError::Database(DatabaseError::OpenFailed { .. }))
        ));
    }
}
