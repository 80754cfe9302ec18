//! Tasklist - a single-user task list with durable local state
//!
//! Tasks can be added, completed, edited, deleted and filtered. The list is
//! owned by a [`TaskStateManager`], which saves it through a
//! [`PersistentStore`] after every change and reloads it on start.

pub mod domain;
pub mod storage;
pub mod manager;
pub mod cli;

pub use domain::{FilterMode, Stats, Task, TaskCollection, TaskId};
pub use manager::{Change, NoopReason, Outcome, Persistence, TaskStateManager};
pub use storage::{
    Config, FileStore, KeyValueStore, LoadWarning, Loaded, MemoryStore, PersistentStore,
    StorageError,
};
