//! Durable key-value storage backing the session.
//!
//! DESIGN
//! ======
//! The interface mirrors browser `localStorage`: string keys, string values,
//! synchronous access. Writes go through `apply` so a multi-key update can be
//! committed as one write by backends that support it.
//!
//! TRADE-OFFS
//! ==========
//! `FileStorage` rewrites the whole file on every batch. The session is three
//! small keys, so a full rewrite via temp file + rename is simpler than any
//! incremental format and never leaves a half-written file behind.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One mutation in a storage batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageChange {
    Set(String, String),
    Remove(String),
}

/// Synchronous key-value storage that survives reloads.
pub trait SessionStorage: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Apply a batch of changes.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot persist the batch.
    fn apply(&self, changes: &[StorageChange]) -> Result<(), StorageError>;
}

// =============================================================================
// MEMORY
// =============================================================================

/// In-memory storage for tests and ephemeral shells.
///
/// Clones share the same map, so a clone handed to a fresh `SessionStore`
/// behaves like a page reload over the same browser storage.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn apply(&self, changes: &[StorageChange]) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        for change in changes {
            match change {
                StorageChange::Set(key, value) => {
                    entries.insert(key.clone(), value.clone());
                }
                StorageChange::Remove(key) => {
                    entries.remove(key);
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// FILE
// =============================================================================

/// JSON-object file storage used by the command-line shell.
///
/// The file is deleted once its last key is removed.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn read_entries(&self) -> BTreeMap<String, String> {
        let Ok(raw) = std::fs::read_to_string(&self.path) else {
            return BTreeMap::new();
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable session file");
                BTreeMap::new()
            }
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if entries.is_empty() {
            return match std::fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            };
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let rendered = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, rendered)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        self.read_entries().remove(key)
    }

    fn apply(&self, changes: &[StorageChange]) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut entries = self.read_entries();
        for change in changes {
            match change {
                StorageChange::Set(key, value) => {
                    entries.insert(key.clone(), value.clone());
                }
                StorageChange::Remove(key) => {
                    entries.remove(key);
                }
            }
        }
        self.write_entries(&entries)
    }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;
