use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use thiserror::Error;

/// Fixed names of the three persisted records.
pub const HABITS_RECORD: &str = "habitflow_habits";
pub const COMPLETIONS_RECORD: &str = "habitflow_completions";
pub const SETTINGS_RECORD: &str = "habitflow_settings";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failure: {0}")]
    Io(#[from] io::Error),
}

/// Durable key-value home for the persisted records. Implementations are
/// injected into the store so the engine can be tested without a real
/// storage medium.
pub trait StorageBackend: Send + Sync {
    fn read(&self, record: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, record: &str, payload: &str) -> Result<(), StorageError>;
}

/// One JSON file per record under a root directory.
#[derive(Debug, Clone)]
pub struct DirectoryStorage {
    root: PathBuf,
}

impl DirectoryStorage {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn record_path(&self, record: &str) -> PathBuf {
        self.root.join(format!("{record}.json"))
    }
}

impl StorageBackend for DirectoryStorage {
    fn read(&self, record: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.record_path(record)) {
            Ok(payload) => Ok(Some(payload)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, record: &str, payload: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.record_path(record), payload)?;
        Ok(())
    }
}

/// In-memory backend for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn read(&self, record: &str) -> Result<Option<String>, StorageError> {
        Ok(self.records.lock().get(record).cloned())
    }

    fn write(&self, record: &str, payload: &str) -> Result<(), StorageError> {
        self.records
            .lock()
            .insert(record.to_string(), payload.to_string());
        Ok(())
    }
}
