//! # Storage Layer
//!
//! Persistence for the task list.
//!
//! ## Layers
//!
//! | Type | Role |
//! |------|------|
//! | [`KeyValueStore`] | Backend contract: whole-value get/set by key |
//! | [`FileStore`] | One JSON file per key, locked and atomically replaced |
//! | [`MemoryStore`] | In-process backend with optional quota |
//! | [`PersistentStore`] | Serializes a [`TaskCollection`](crate::domain::TaskCollection) to a key and back |
//! | [`Config`] | User configuration (storage location, key, default filter) |
//!
//! ## Stored Format
//!
//! The value under the key is a JSON array:
//!
//! ```text
//! [{"id":1712345678901,"text":"Buy milk","completed":false}, ...]
//! ```
//!
//! ## Concurrency
//!
//! Two processes sharing a key each write the whole list; the last save
//! wins. There is no merge.

mod backend;
mod file;
mod persistent;
mod config;

pub use backend::{KeyValueStore, MemoryStore, StorageError};
pub use file::FileStore;
pub use persistent::{LoadWarning, Loaded, PersistentStore};
pub use config::{Config, ConfigError, DEFAULT_STORAGE_KEY};
