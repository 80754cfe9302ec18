//! Key-value backends
//!
//! A backend stores one string value per key and overwrites it whole on
//! every write. [`FileStore`](super::FileStore) is the durable backend;
//! [`MemoryStore`] lives in process and is handy for embedding and tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;

use thiserror::Error;

/// Failures at the storage layer
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to lock {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid storage key '{0}': use letters, digits, '-' or '_'")]
    InvalidKey(String),

    #[error("Storage quota exceeded: {needed} bytes needed, limit is {limit}")]
    QuotaExceeded { needed: usize, limit: usize },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Stored value in {path} is not valid UTF-8")]
    InvalidUtf8 { path: PathBuf },

    #[error("Failed to serialize tasks: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Durable string storage addressed by key
pub trait KeyValueStore {
    /// Reads the value stored under `key`, or `None` if nothing is there
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the value stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// Checks that a key is usable by every backend
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    entries: HashMap<String, String>,
    quota: Option<usize>,
    unavailable: bool,
}

/// In-process backend
///
/// Clones share the same entries, the way two browser tabs share one
/// origin's storage. The total byte size of all values can be capped with
/// [`MemoryStore::with_quota`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryStore {
    /// Creates an empty store with no quota
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that holds at most `limit` bytes of values
    pub fn with_quota(limit: usize) -> Self {
        let store = Self::new();
        store.state.borrow_mut().quota = Some(limit);
        store
    }

    /// Makes every later read and write fail (or succeed again)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.borrow_mut().unavailable = unavailable;
    }

    /// Writes a raw value, bypassing quota and availability checks
    pub fn insert_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        self.state
            .borrow_mut()
            .entries
            .insert(key.into(), value.into());
    }

    /// Reads a raw value, bypassing availability checks
    pub fn raw(&self, key: &str) -> Option<String> {
        self.state.borrow().entries.get(key).cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        let state = self.state.borrow();
        if state.unavailable {
            return Err(StorageError::Unavailable("memory store is offline".to_string()));
        }
        Ok(state.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let mut state = self.state.borrow_mut();
        if state.unavailable {
            return Err(StorageError::Unavailable("memory store is offline".to_string()));
        }

        if let Some(limit) = state.quota {
            let others: usize = state
                .entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            let needed = others + value.len();
            if needed > limit {
                return Err(StorageError::QuotaExceeded { needed, limit });
            }
        }

        state.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
