use std::cell::RefCell;

use super::{ProgressStore, StoreError, StudyProgress};

/// Non-persistent store for tests and throwaway sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    progress: RefCell<StudyProgress>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_progress(progress: StudyProgress) -> Self {
        Self {
            progress: RefCell::new(progress),
        }
    }

    pub fn snapshot(&self) -> StudyProgress {
        self.progress.borrow().clone()
    }
}

impl ProgressStore for MemoryStore {
    fn load(&self) -> Result<StudyProgress, StoreError> {
        Ok(self.snapshot())
    }

    fn save(&self, progress: &StudyProgress) -> Result<(), StoreError> {
        *self.progress.borrow_mut() = progress.clone();
        Ok(())
    }
}
