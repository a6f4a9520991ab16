//! Core error types for chronodrift-core.
//!
//! Two families live here. [`Rejection`] is the non-fatal outcome of a
//! tracker operation that was ignored: the state is unchanged and the caller
//! decides whether to surface it. [`CoreError`] and friends cover the I/O
//! edge (database, config files) and are the only errors that carry sources.

use std::path::PathBuf;
use thiserror::Error;

use crate::task::{TaskAction, TaskStatus};

/// Core error type for chronodrift-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Stored snapshot could not be decoded
    #[error("Stored snapshot is corrupt: {0}")]
    CorruptSnapshot(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Distortion curve does not cover [0, 100] contiguously
    #[error("Invalid distortion curve: {0}")]
    InvalidCurve(String),

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// A tracker operation that was ignored.
///
/// None of these are fatal. Whenever one is returned the tracker state is
/// exactly what it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The operation targeted a task id the tracker does not know.
    #[error("unknown task: {0}")]
    InvalidReference(String),

    /// The task's current status does not allow the action.
    #[error("cannot {action} a task that is {from}")]
    IllegalTransition { from: TaskStatus, action: TaskAction },

    /// A focus session is already open.
    #[error("a focus session is already active")]
    SessionAlreadyActive,

    /// There is no open focus session to end.
    #[error("no focus session is active")]
    NoActiveSession,
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
