//! Application configuration.
//!
//! Scheduler constants, storage backend and deck location are read from
//! `config.toml`, then `.env` / environment variables, then defaults.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{DEFAULT_EASE_FACTOR, DEFAULT_RESPONSE_TIME_SECS};
use crate::paths;

/// Default config file looked up in the working directory
pub const CONFIG_FILE: &str = "config.toml";

// ==================== Scheduler Configuration ====================

/// Constants used by the spaced repetition engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SrsConfig {
    /// Floor applied after every ease factor update
    pub min_ease_factor: f64,
    /// Ease factor for cards that have never been graded
    pub default_ease_factor: f64,
    /// Interval in days after the first successful review
    pub first_interval: u32,
    /// Interval in days after the second successful review
    pub second_interval: u32,
    /// Longest interval in days a passing review can produce; keep dates
    /// before year 10000 so they round-trip through RFC 3339
    pub max_interval: u32,
    pub default_response_time_secs: f64,
    pub session_length: usize,
    /// Cards at or above this ease (with 2+ repetitions) count as mastered
    pub mastered_ease_factor: f64,
    /// Cards below this ease are reported as difficult
    pub difficult_ease_factor: f64,
    pub low_retention_percent: u32,
    pub heavy_workload_cards: usize,
}

impl Default for SrsConfig {
    fn default() -> Self {
        Self {
            min_ease_factor: 1.3,
            default_ease_factor: DEFAULT_EASE_FACTOR,
            first_interval: 1,
            second_interval: 6,
            max_interval: 36_500,
            default_response_time_secs: DEFAULT_RESPONSE_TIME_SECS,
            session_length: 20,
            mastered_ease_factor: 2.5,
            difficult_ease_factor: 2.0,
            low_retention_percent: 70,
            heavy_workload_cards: 50,
        }
    }
}

// ==================== Storage Configuration ====================

/// Where study progress is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Json,
    Sqlite,
}

impl StorageBackend {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "sqlite" => Some(Self::Sqlite),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Sqlite => "sqlite",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
struct StorageSection {
    backend: Option<StorageBackend>,
    path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
struct DeckSection {
    path: Option<String>,
}

/// Configuration file structure for config.toml
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    srs: SrsConfig,
    storage: Option<StorageSection>,
    deck: Option<DeckSection>,
}

/// Fully resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub srs: SrsConfig,
    pub storage: StorageBackend,
    pub progress_path: PathBuf,
    pub deck_path: PathBuf,
}

impl AppConfig {
    /// Load configuration with priority: config file > .env > default
    pub fn load_from(config_path: &Path) -> Self {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let file = read_config_file(config_path).unwrap_or_default();
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    fn resolve(file: ConfigFile, env: impl Fn(&str) -> Option<String>) -> Self {
        let storage_section = file.storage.unwrap_or_default();

        let storage = storage_section
            .backend
            .or_else(|| {
                env("PREP_SRS_STORAGE").and_then(|value| {
                    let backend = StorageBackend::from_str(&value);
                    if backend.is_none() {
                        tracing::warn!("Ignoring unknown PREP_SRS_STORAGE value: {}", value);
                    }
                    backend
                })
            })
            .unwrap_or_default();

        let progress_path = storage_section
            .path
            .or_else(|| env("PREP_SRS_PROGRESS_PATH"))
            .map(PathBuf::from)
            .unwrap_or_else(|| paths::default_progress_path(storage));

        let deck_path = file
            .deck
            .and_then(|deck| deck.path)
            .or_else(|| env("PREP_SRS_DECK_PATH"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(paths::deck_path()));

        tracing::debug!(
            "Using {} storage at {}, deck {}",
            storage.as_str(),
            progress_path.display(),
            deck_path.display()
        );

        Self {
            srs: file.srs,
            storage,
            progress_path,
            deck_path,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::resolve(ConfigFile::default(), |_| None)
    }
}

fn read_config_file(path: &Path) -> Option<ConfigFile> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(_) => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return None;
        }
    };

    match toml::from_str::<ConfigFile>(&contents) {
        Ok(config) => {
            tracing::info!("Loaded configuration from {}", path.display());
            Some(config)
        }
        Err(e) => {
            tracing::warn!("Failed to parse {}, using defaults: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(toml_str: &str) -> ConfigFile {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn test_srs_defaults() {
        let config = SrsConfig::default();
        assert!((config.min_ease_factor - 1.3).abs() < f64::EPSILON);
        assert!((config.default_ease_factor - 2.5).abs() < f64::EPSILON);
        assert_eq!(config.first_interval, 1);
        assert_eq!(config.second_interval, 6);
        assert_eq!(config.max_interval, 36_500);
        assert_eq!(config.session_length, 20);
    }

    #[test]
    fn test_partial_srs_section_keeps_defaults() {
        let file = parse(
            r#"
            [srs]
            session_length = 10
            min_ease_factor = 1.5
            "#,
        );

        assert_eq!(file.srs.session_length, 10);
        assert!((file.srs.min_ease_factor - 1.5).abs() < f64::EPSILON);
        assert_eq!(file.srs.second_interval, 6);
    }

    #[test]
    fn test_file_takes_priority_over_env() {
        let file = parse(
            r#"
            [storage]
            backend = "sqlite"
            path = "/tmp/from-file.db"
            "#,
        );
        let env: HashMap<&str, &str> = [
            ("PREP_SRS_STORAGE", "json"),
            ("PREP_SRS_PROGRESS_PATH", "/tmp/from-env.json"),
        ]
        .into_iter()
        .collect();

        let config = AppConfig::resolve(file, |key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.storage, StorageBackend::Sqlite);
        assert_eq!(config.progress_path, PathBuf::from("/tmp/from-file.db"));
    }

    #[test]
    fn test_env_used_when_file_silent() {
        let env: HashMap<&str, &str> = [
            ("PREP_SRS_STORAGE", "SQLite"),
            ("PREP_SRS_DECK_PATH", "/tmp/deck.json"),
        ]
        .into_iter()
        .collect();

        let config =
            AppConfig::resolve(ConfigFile::default(), |key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.storage, StorageBackend::Sqlite);
        assert_eq!(config.deck_path, PathBuf::from("/tmp/deck.json"));
    }

    #[test]
    fn test_unknown_backend_falls_back() {
        let config = AppConfig::resolve(ConfigFile::default(), |key| {
            (key == "PREP_SRS_STORAGE").then(|| "redis".to_string())
        });
        assert_eq!(config.storage, StorageBackend::Json);
    }

    #[test]
    fn test_unparsable_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "this is = = not toml").unwrap();

        assert!(read_config_file(&path).is_none());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_config_file(&dir.path().join("absent.toml")).is_none());
    }

    #[test]
    fn test_storage_backend_roundtrip() {
        for backend in [StorageBackend::Json, StorageBackend::Sqlite] {
            assert_eq!(StorageBackend::from_str(backend.as_str()), Some(backend));
        }
    }
}
