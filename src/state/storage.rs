//! Key-value storage port for persisted client state.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session and feature code never touch a concrete backend directly.
//! `MemoryStore` backs process-scoped state and tests; `FileStore` backs
//! state that must survive a restart (credential, profile, match caches).

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// String-to-string store with browser-storage semantics.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// All keys currently stored, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the backend cannot be read.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// Load a JSON value stored under `key`. Missing or undecodable values read as `None`.
///
/// # Errors
///
/// Returns a [`StorageError`] only when the backend itself fails.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>, StorageError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(key, error = %e, "discarding undecodable stored value");
            Ok(None)
        }
    }
}

/// Save `value` as JSON under `key`.
///
/// # Errors
///
/// Returns a [`StorageError`] when encoding or the write fails.
pub fn save_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

/// Remove every key starting with `prefix`; returns how many were removed.
///
/// Keys are collected before removal so the sweep never iterates a store it
/// is mutating.
///
/// # Errors
///
/// Returns the first [`StorageError`] raised by the backend.
pub fn remove_prefixed(store: &dyn KeyValueStore, prefix: &str) -> Result<usize, StorageError> {
    let doomed: Vec<String> = store.keys()?.into_iter().filter(|k| k.starts_with(prefix)).collect();
    for key in &doomed {
        store.remove(key)?;
    }
    Ok(doomed.len())
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// Process-lifetime store; the analogue of `sessionStorage`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        lock(&self.entries).insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        lock(&self.entries).remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(lock(&self.entries).keys().cloned().collect())
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// Write-through JSON file store; the analogue of `localStorage`.
///
/// The whole map is rewritten on every mutation via a temp file + rename, so
/// a crash mid-write leaves the previous file intact.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    pub const FILE_NAME: &'static str = "storage.json";

    /// Open (or lazily create) the store file inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when an existing file cannot be read or
    /// is not a JSON object of strings.
    pub fn open(dir: &Path) -> Result<Self, StorageError> {
        let path = dir.join(Self::FILE_NAME);
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), keys = entries.len(), "opened file store");
        Ok(Self { path, entries: Mutex::new(entries) })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = lock(&self.entries);
        entries.insert(key.to_owned(), value.to_owned());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = lock(&self.entries);
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.flush(&entries)
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(lock(&self.entries).keys().cloned().collect())
    }
}
