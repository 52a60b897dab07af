//! Study progress persistence.
//!
//! The engine never touches storage; callers load a [`StudyProgress`], hand
//! its pieces to the engine and save the result back through a
//! [`ProgressStore`].

pub mod json;
pub mod memory;
pub mod sqlite;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::{AppConfig, StorageBackend};
use crate::domain::{Card, CardSchedule, ReviewHistoryEntry};

pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Everything persisted between sittings: per-card schedules and the review log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudyProgress {
    #[serde(default)]
    pub schedules: BTreeMap<String, CardSchedule>,
    #[serde(default)]
    pub history: Vec<ReviewHistoryEntry>,
}

impl StudyProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_for(&self, card_id: &str) -> CardSchedule {
        self.schedules.get(card_id).cloned().unwrap_or_default()
    }

    /// Attach stored schedules to deck cards; unknown cards start fresh
    pub fn apply_to(&self, cards: &mut [Card]) {
        for card in cards {
            card.schedule = self.schedule_for(&card.id);
        }
    }
}

pub trait ProgressStore {
    fn load(&self) -> Result<StudyProgress, StoreError>;
    fn save(&self, progress: &StudyProgress) -> Result<(), StoreError>;

    /// Stored schedule for one card, default when it was never graded
    fn schedule(&self, card_id: &str) -> Result<CardSchedule, StoreError> {
        Ok(self.load()?.schedule_for(card_id))
    }

    /// Persist one graded review: replace the card's schedule and append the entry
    fn record(
        &self,
        card_id: &str,
        schedule: &CardSchedule,
        entry: &ReviewHistoryEntry,
    ) -> Result<(), StoreError> {
        let mut progress = self.load()?;
        progress.schedules.insert(card_id.to_string(), schedule.clone());
        progress.history.push(entry.clone());
        self.save(&progress)
    }

    /// Remove all stored progress
    fn clear(&self) -> Result<(), StoreError> {
        self.save(&StudyProgress::default())
    }
}

impl<S: ProgressStore + ?Sized> ProgressStore for Box<S> {
    fn load(&self) -> Result<StudyProgress, StoreError> {
        (**self).load()
    }

    fn save(&self, progress: &StudyProgress) -> Result<(), StoreError> {
        (**self).save(progress)
    }

    fn schedule(&self, card_id: &str) -> Result<CardSchedule, StoreError> {
        (**self).schedule(card_id)
    }

    fn record(
        &self,
        card_id: &str,
        schedule: &CardSchedule,
        entry: &ReviewHistoryEntry,
    ) -> Result<(), StoreError> {
        (**self).record(card_id, schedule, entry)
    }

    fn clear(&self) -> Result<(), StoreError> {
        (**self).clear()
    }
}

/// Open the store selected by configuration
pub fn open_store(config: &AppConfig) -> Result<Box<dyn ProgressStore>, StoreError> {
    match config.storage {
        StorageBackend::Json => Ok(Box::new(JsonFileStore::new(&config.progress_path))),
        StorageBackend::Sqlite => Ok(Box::new(SqliteStore::open(&config.progress_path)?)),
    }
}

/// Progress storage errors.
#[derive(Debug)]
pub enum StoreError {
    Io(String, String),
    Parse(String, String),
    Db(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(path, err) => write!(f, "IO error accessing {}: {}", path, err),
            StoreError::Parse(path, err) => write!(f, "Parse error in {}: {}", path, err),
            StoreError::Db(err) => write!(f, "Database error: {}", err),
        }
    }
}

impl StoreError {
    /// Returns a user-facing error message without exposing filesystem paths.
    pub fn user_message(&self) -> &'static str {
        match self {
            StoreError::Io(_, _) => "Failed to access study progress",
            StoreError::Parse(_, _) => "Study progress is corrupted",
            StoreError::Db(_) => "Study progress database unavailable",
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Db(e.to_string())
    }
}
