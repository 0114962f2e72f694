//! In-memory storage, for tests and ephemeral servers.

use std::sync::Mutex;

use crate::error::{EngineError, EngineResult};

use super::{DataStore, Dataset};

/// Keeps the dataset in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    dataset: Mutex<Dataset>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `dataset`.
    pub fn with_dataset(dataset: Dataset) -> Self {
        Self {
            dataset: Mutex::new(dataset),
        }
    }
}

fn poisoned() -> EngineError {
    EngineError::StorageError {
        path: "memory".to_string(),
        message: "store lock poisoned".to_string(),
    }
}

impl DataStore for MemoryStore {
    fn load(&self) -> EngineResult<Dataset> {
        self.dataset.lock().map(|dataset| dataset.clone()).map_err(|_| poisoned())
    }

    fn save(&self, dataset: &Dataset) -> EngineResult<()> {
        let mut stored = self.dataset.lock().map_err(|_| poisoned())?;
        *stored = dataset.clone();
        Ok(())
    }
}
