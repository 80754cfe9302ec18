//! Domain models for the task list
//!
//! Contains the core business logic without any I/O concerns.

mod id;
mod task;
mod filter;
mod stats;

pub use id::{TaskId, TaskIdError};
pub use task::{normalize_text, CollectionError, Task, TaskCollection};
pub use filter::{FilterMode, FilterModeError};
pub use stats::Stats;
