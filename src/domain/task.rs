//! Task domain model
//!
//! A task is one line of the list: an immutable ID, a trimmed non-empty
//! text and a completion flag. The collection keeps tasks in the order they
//! were created; edits and toggles never move a task and removal leaves the
//! survivors in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use super::id::TaskId;

/// Returns the trimmed text, or `None` if nothing is left
pub fn normalize_text(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// A single to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier, assigned at creation
    pub id: TaskId,

    /// Display text, always trimmed and non-empty
    pub text: String,

    /// Whether the task has been done
    pub completed: bool,
}

impl Task {
    /// Creates a new, not yet completed task
    pub fn new(id: TaskId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
        }
    }

    /// Flips the completion flag
    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }

    /// Returns true if the task is still open
    pub fn is_active(&self) -> bool {
        !self.completed
    }
}

/// Reasons a stored collection is rejected on load
#[derive(Debug, Error, PartialEq)]
pub enum CollectionError {
    #[error("Duplicate task ID: {0}")]
    DuplicateId(TaskId),

    #[error("Task {0} has blank text")]
    BlankText(TaskId),

    #[error("Task {0} has untrimmed text")]
    UntrimmedText(TaskId),
}

/// Ordered list of tasks, in creation order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskCollection(Vec<Task>);

impl TaskCollection {
    /// Creates an empty collection
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns the number of tasks
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no tasks
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates tasks in creation order
    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.0.iter()
    }

    /// Returns the tasks as a slice
    pub fn as_slice(&self) -> &[Task] {
        &self.0
    }

    /// Looks up a task by ID
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.0.iter().find(|t| t.id == id)
    }

    /// Returns true if a task with this ID exists
    pub fn contains(&self, id: TaskId) -> bool {
        self.get(id).is_some()
    }

    /// Returns the largest ID in use
    pub fn max_id(&self) -> Option<TaskId> {
        self.0.iter().map(|t| t.id).max()
    }

    /// Creates a task from `text` and appends it
    ///
    /// Returns `None` (and leaves the collection alone) if the text is blank.
    pub fn push_text(&mut self, text: &str, now: DateTime<Utc>) -> Option<TaskId> {
        let text = normalize_text(text)?;
        let id = TaskId::allocate(now, self.max_id());
        self.0.push(Task::new(id, text));
        Some(id)
    }

    /// Flips completion of a task; returns false if the ID is unknown
    pub fn toggle(&mut self, id: TaskId) -> bool {
        match self.get_mut(id) {
            Some(task) => {
                task.toggle();
                true
            }
            None => false,
        }
    }

    /// Removes a task in place; returns false if the ID is unknown
    pub fn remove(&mut self, id: TaskId) -> bool {
        let len_before = self.0.len();
        self.0.retain(|t| t.id != id);
        self.0.len() != len_before
    }

    /// Replaces the text of a task
    ///
    /// The caller has already normalized `text`. Returns false if the ID is
    /// unknown.
    pub fn set_text(&mut self, id: TaskId, text: &str) -> bool {
        match self.get_mut(id) {
            Some(task) => {
                task.text = text.to_string();
                true
            }
            None => false,
        }
    }

    /// Checks the collection-level invariants
    pub fn validate(&self) -> Result<(), CollectionError> {
        let mut seen = HashSet::with_capacity(self.0.len());
        for task in &self.0 {
            if !seen.insert(task.id) {
                return Err(CollectionError::DuplicateId(task.id));
            }
            match normalize_text(&task.text) {
                None => return Err(CollectionError::BlankText(task.id)),
                Some(trimmed) if trimmed != task.text => {
                    return Err(CollectionError::UntrimmedText(task.id))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.0.iter_mut().find(|t| t.id == id)
    }
}

impl From<Vec<Task>> for TaskCollection {
    fn from(tasks: Vec<Task>) -> Self {
        Self(tasks)
    }
}

impl<'a> IntoIterator for &'a TaskCollection {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
