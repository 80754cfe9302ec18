//! View selection over a task collection

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::task::{Task, TaskCollection};

#[derive(Debug, Error, PartialEq)]
#[error("Unknown filter '{0}': expected one of all, active, completed")]
pub struct FilterModeError(String);

/// Which tasks a view shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    #[default]
    All,
    Active,
    Completed,
}

impl FilterMode {
    /// Returns true if `task` belongs in this view
    pub fn matches(self, task: &Task) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::Active => !task.completed,
            FilterMode::Completed => task.completed,
        }
    }

    /// Returns the lowercase name of the mode
    pub fn as_str(self) -> &'static str {
        match self {
            FilterMode::All => "all",
            FilterMode::Active => "active",
            FilterMode::Completed => "completed",
        }
    }

    /// Iterates the tasks of `tasks` selected by this mode, in order
    ///
    /// The iterator is `Clone`, so a view can be walked more than once.
    pub fn apply(self, tasks: &TaskCollection) -> impl Iterator<Item = &Task> + Clone + '_ {
        tasks.iter().filter(move |task| self.matches(task))
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterMode {
    type Err = FilterModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(FilterMode::All),
            "active" => Ok(FilterMode::Active),
            "completed" => Ok(FilterMode::Completed),
            other => Err(FilterModeError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskId;

    fn sample() -> TaskCollection {
        let mut done = Task::new(TaskId::new(2), "done");
        done.completed = true;
        TaskCollection::from(vec![
            Task::new(TaskId::new(1), "open"),
            done,
            Task::new(TaskId::new(3), "also open"),
        ])
    }

    fn ids<'a>(iter: impl Iterator<Item = &'a Task>) -> Vec<u64> {
        iter.map(|t| t.id.get()).collect()
    }

    #[test]
    fn all_keeps_everything_in_order() {
        let tasks = sample();
        assert_eq!(ids(FilterMode::All.apply(&tasks)), vec![1, 2, 3]);
    }

    #[test]
    fn active_and_completed_partition() {
        let tasks = sample();
        assert_eq!(ids(FilterMode::Active.apply(&tasks)), vec![1, 3]);
        assert_eq!(ids(FilterMode::Completed.apply(&tasks)), vec![2]);
    }

    #[test]
    fn view_is_restartable() {
        let tasks = sample();
        let view = FilterMode::Active.apply(&tasks);
        let first: Vec<_> = view.clone().collect();
        let second: Vec<_> = view.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn parse_and_display() {
        assert_eq!("Completed".parse::<FilterMode>().unwrap(), FilterMode::Completed);
        assert_eq!(" active ".parse::<FilterMode>().unwrap(), FilterMode::Active);
        assert!("done".parse::<FilterMode>().is_err());
        assert_eq!(FilterMode::All.to_string(), "all");
        assert_eq!(FilterMode::default(), FilterMode::All);
    }
}
