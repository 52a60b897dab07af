//! Project path functions - single source of truth for all file paths.
//!
//! ## Environment Variables
//!
//! - `DATA_DIR`: Override the base data directory (default: "data")

use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;

use crate::config::StorageBackend;

/// Lazily initialized data directory from DATA_DIR env var
static DATA_DIR_VALUE: OnceLock<String> = OnceLock::new();

/// Get the base data directory (from DATA_DIR env var or default "data")
pub fn data_dir() -> &'static str {
    DATA_DIR_VALUE.get_or_init(|| env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()))
}

/// JSON progress file (schedules + review history)
pub fn json_progress_path() -> String {
    format!("{}/progress.json", data_dir())
}

/// SQLite progress database
pub fn sqlite_progress_path() -> String {
    format!("{}/progress.db", data_dir())
}

/// Default flashcard deck
pub fn deck_path() -> String {
    format!("{}/deck.json", data_dir())
}

pub fn default_progress_path(backend: StorageBackend) -> PathBuf {
    match backend {
        StorageBackend::Json => PathBuf::from(json_progress_path()),
        StorageBackend::Sqlite => PathBuf::from(sqlite_progress_path()),
    }
}
