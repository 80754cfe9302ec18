//! # Command-Line Interface
//!
//! A thin presentation layer over [`TaskStateManager`](crate::TaskStateManager).
//!
//! ## Commands
//!
//! | Command | Operation |
//! |---------|-----------|
//! | `add <TEXT>...` | Append a task |
//! | `toggle <ID>` | Flip completion |
//! | `rm <ID>` | Delete a task |
//! | `edit <ID> <TEXT>...` | Replace task text |
//! | `list [--filter all\|active\|completed]` | Show a filtered view |
//! | `stats` | Show counts and completion rate |
//!
//! Blank text and unknown IDs print a notice and exit successfully. A
//! failed save exits with an error, since the in-memory change dies with
//! the process.
//!
//! ## Output Formats
//!
//! All commands support `--format text` (default) and `--format json`.
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod task;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
