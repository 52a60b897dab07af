//! Single JSON document store, the desktop stand-in for the browser's
//! `flashcard-progress` local storage key.

use std::fs;
use std::path::{Path, PathBuf};

use super::{ProgressStore, StoreError, StudyProgress};

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display(&self) -> String {
        self.path.display().to_string()
    }
}

impl ProgressStore for JsonFileStore {
    fn load(&self) -> Result<StudyProgress, StoreError> {
        if !self.path.exists() {
            tracing::debug!("No progress file at {}, starting fresh", self.display());
            return Ok(StudyProgress::default());
        }

        let content =
            fs::read_to_string(&self.path).map_err(|e| StoreError::Io(self.display(), e.to_string()))?;

        if content.trim().is_empty() {
            return Ok(StudyProgress::default());
        }

        let progress: StudyProgress =
            serde_json::from_str(&content).map_err(|e| StoreError::Parse(self.display(), e.to_string()))?;

        tracing::debug!(
            "Loaded {} schedules and {} reviews from {}",
            progress.schedules.len(),
            progress.history.len(),
            self.display()
        );
        Ok(progress)
    }

    fn save(&self, progress: &StudyProgress) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| StoreError::Io(self.display(), e.to_string()))?;
            }
        }

        let content = serde_json::to_string_pretty(progress)
            .map_err(|e| StoreError::Parse(self.display(), e.to_string()))?;

        // Replace atomically via a sibling temp file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(|e| StoreError::Io(self.display(), e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::Io(self.display(), e.to_string()))?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(self.display(), e.to_string())),
        }
    }
}
