mod config;
pub mod database;

pub use config::{Config, DistortionConfig, TaskConfig, TimerConfig};
pub use database::Database;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `CHRONODRIFT_DATA_DIR` wins when set. Otherwise the directory is
/// `~/.config/chronodrift[-dev]/`, with the `-dev` suffix selected by
/// `CHRONODRIFT_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("CHRONODRIFT_DATA_DIR") {
        Some(explicit) if !explicit.is_empty() => PathBuf::from(explicit),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env =
                std::env::var("CHRONODRIFT_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("chronodrift-dev")
            } else {
                base_dir.join("chronodrift")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
