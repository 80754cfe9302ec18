//! Loading and saving the task collection under a storage key
//!
//! Loading never fails: a missing value is an empty list, and a value that
//! cannot be read or does not hold a valid collection yields an empty list
//! plus a [`LoadWarning`]. Saving serializes the whole collection and
//! overwrites whatever the key held before.

use std::fmt;

use crate::domain::TaskCollection;

use super::backend::{KeyValueStore, StorageError};

/// Why a load fell back to an empty collection
#[derive(Debug)]
pub enum LoadWarning {
    /// The stored value is not a valid task collection
    CorruptData(String),
    /// The backend could not be read
    Unavailable(StorageError),
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::CorruptData(reason) => {
                write!(f, "stored tasks are corrupt and were ignored: {}", reason)
            }
            LoadWarning::Unavailable(err) => {
                write!(f, "stored tasks could not be read: {}", err)
            }
        }
    }
}

/// Result of [`PersistentStore::load`]
#[derive(Debug, Default)]
pub struct Loaded {
    pub tasks: TaskCollection,
    pub warning: Option<LoadWarning>,
}

impl Loaded {
    fn fallback(warning: LoadWarning) -> Self {
        Self {
            tasks: TaskCollection::new(),
            warning: Some(warning),
        }
    }
}

/// Serializing bridge between a task collection and a key-value backend
#[derive(Debug, Clone)]
pub struct PersistentStore<S> {
    backend: S,
}

impl<S: KeyValueStore> PersistentStore<S> {
    /// Wraps a backend
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    /// Returns the underlying backend
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Reads the collection stored under `key`
    pub fn load(&self, key: &str) -> Loaded {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key, "no stored tasks, starting empty");
                return Loaded::default();
            }
            Err(err @ StorageError::InvalidUtf8 { .. }) => {
                tracing::warn!(key, error = %err, "stored tasks are not text, starting empty");
                return Loaded::fallback(LoadWarning::CorruptData(err.to_string()));
            }
            Err(err) => {
                tracing::warn!(key, error = %err, "failed to read stored tasks, starting empty");
                return Loaded::fallback(LoadWarning::Unavailable(err));
            }
        };

        let tasks: TaskCollection = match serde_json::from_str(&raw) {
            Ok(tasks) => tasks,
            Err(err) => {
                tracing::warn!(key, error = %err, "stored tasks failed to parse, starting empty");
                return Loaded::fallback(LoadWarning::CorruptData(err.to_string()));
            }
        };

        if let Err(err) = tasks.validate() {
            tracing::warn!(key, error = %err, "stored tasks are invalid, starting empty");
            return Loaded::fallback(LoadWarning::CorruptData(err.to_string()));
        }

        tracing::debug!(key, count = tasks.len(), "loaded stored tasks");
        Loaded {
            tasks,
            warning: None,
        }
    }

    /// Writes `tasks` under `key`, replacing the previous value
    pub fn save(&self, key: &str, tasks: &TaskCollection) -> Result<(), StorageError> {
        let raw = serde_json::to_string(tasks)?;
        self.backend.set(key, &raw)
    }
}
