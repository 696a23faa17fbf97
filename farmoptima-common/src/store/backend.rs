//! Key-value storage backends
//!
//! A backend stores one serialized string per key. It knows nothing about
//! the collections; [`super::Slot`] handles (de)serialization and fallback.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use tracing::debug;

/// Storage backend errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage quota exceeded: {requested} bytes requested, {available} available")]
    QuotaExceeded { requested: usize, available: usize },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Raw string storage addressed by slot key
pub trait StorageBackend: Send + Sync {
    /// Read the stored value, `Ok(None)` when nothing was ever written
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the stored value
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// One `<key>.json` file per slot inside a data folder
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Backend rooted at `root`. The folder is not created.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Backend rooted at `root`, creating the folder if missing
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let backend = Self::new(root);
        if !backend.root.exists() {
            std::fs::create_dir_all(&backend.root)?;
            debug!("Created data folder {}", backend.root.display());
        }
        Ok(backend)
    }

    /// File holding `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let target = self.path_for(key);
        let temp = self.root.join(format!("{}.json.tmp", key));

        // Temp + rename keeps the previous value intact if the write dies midway
        std::fs::write(&temp, value)?;
        if let Err(e) = std::fs::rename(&temp, &target) {
            let _ = std::fs::remove_file(&temp);
            return Err(e.into());
        }
        Ok(())
    }
}

/// In-process backend with an optional byte quota
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

}

#[cfg(test)]
impl MemoryBackend {
    /// Backend that rejects writes once the stored values exceed `bytes` in total
    pub(crate) fn with_quota(bytes: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota_bytes: Some(bytes),
        }
    }

    /// Number of keys currently stored
    pub(crate) fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(quota) = self.quota_bytes {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            let available = quota.saturating_sub(others);
            if value.len() > available {
                return Err(StorageError::QuotaExceeded {
                    requested: value.len(),
                    available,
                });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
