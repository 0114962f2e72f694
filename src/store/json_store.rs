//! JSON file storage.
//!
//! One pretty-printed JSON file per collection in a data directory. Files are
//! replaced atomically: written to a temporary sibling, synced, then renamed
//! over the original.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::{DataStore, Dataset};

const EMPLOYEES_FILE: &str = "employees.json";
const ATTENDANCE_FILE: &str = "attendance.json";
const ADJUSTMENTS_FILE: &str = "adjustments.json";

/// Stores the dataset as JSON files under one directory.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    /// Uses `dir`, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> EngineResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| storage_error(&dir, e))?;
        Ok(Self { dir })
    }

    /// The data directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_collection<T: DeserializeOwned + Default>(&self, name: &str) -> EngineResult<T> {
        let path = self.dir.join(name);
        if !path.exists() {
            return Ok(T::default());
        }
        let content = fs::read_to_string(&path).map_err(|e| storage_error(&path, e))?;
        if content.trim().is_empty() {
            return Ok(T::default());
        }
        serde_json::from_str(&content).map_err(|e| storage_error(&path, e))
    }

    fn write_collection<T: Serialize>(&self, name: &str, value: &T) -> EngineResult<()> {
        let path = self.dir.join(name);
        let temp_path = self.dir.join(format!(".{name}.tmp"));

        let write = || -> std::io::Result<()> {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
            fs::rename(&temp_path, &path)
        };

        write().map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            storage_error(&path, e)
        })
    }
}

impl DataStore for JsonStore {
    fn load(&self) -> EngineResult<Dataset> {
        Ok(Dataset {
            employees: self.read_collection(EMPLOYEES_FILE)?,
            attendance: self.read_collection(ATTENDANCE_FILE)?,
            adjustments: self.read_collection(ADJUSTMENTS_FILE)?,
        })
    }

    fn save(&self, dataset: &Dataset) -> EngineResult<()> {
        self.write_collection(EMPLOYEES_FILE, &dataset.employees)?;
        self.write_collection(ATTENDANCE_FILE, &dataset.attendance)?;
        self.write_collection(ADJUSTMENTS_FILE, &dataset.adjustments)?;
        debug!(
            dir = %self.dir.display(),
            employees = dataset.employees.len(),
            attendance = dataset.attendance.len(),
            adjustments = dataset.adjustments.len(),
            "Dataset saved"
        );
        Ok(())
    }
}

fn storage_error(path: &Path, error: impl std::fmt::Display) -> EngineError {
    EngineError::StorageError {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}
