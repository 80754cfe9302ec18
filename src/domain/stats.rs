//! Aggregate counts over a task collection
//!
//! Stats are derived on demand and never stored.

use serde::Serialize;

use super::task::TaskCollection;

/// Summary of a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Stats {
    pub total: usize,
    pub completed_count: usize,
    pub active_count: usize,
    /// Share of completed tasks, rounded to the nearest whole percent
    pub completion_rate_percent: u8,
}

impl Stats {
    /// Computes stats for `tasks`
    pub fn of(tasks: &TaskCollection) -> Self {
        let total = tasks.len();
        let completed_count = tasks.iter().filter(|t| t.completed).count();
        Self {
            total,
            completed_count,
            active_count: total - completed_count,
            completion_rate_percent: rounded_percent(completed_count, total),
        }
    }
}

/// `round(part / whole * 100)` with halves rounded up, or 0 for an empty whole
fn rounded_percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let part = part as u128;
    let whole = whole as u128;
    let percent = (part * 200 + whole) / (whole * 2);
    u8::try_from(percent.min(100)).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Task, TaskId};

    fn collection(done: usize, open: usize) -> TaskCollection {
        let mut tasks = Vec::new();
        let mut next = 1;
        for _ in 0..done {
            let mut task = Task::new(TaskId::new(next), "done");
            task.completed = true;
            tasks.push(task);
            next += 1;
        }
        for _ in 0..open {
            tasks.push(Task::new(TaskId::new(next), "open"));
            next += 1;
        }
        TaskCollection::from(tasks)
    }

    #[test]
    fn empty_collection() {
        assert_eq!(Stats::of(&TaskCollection::new()), Stats::default());
    }

    #[test]
    fn half_done() {
        let stats = Stats::of(&collection(1, 1));
        assert_eq!(
            stats,
            Stats {
                total: 2,
                completed_count: 1,
                active_count: 1,
                completion_rate_percent: 50,
            }
        );
    }

    #[test]
    fn rounds_to_nearest() {
        assert_eq!(rounded_percent(1, 3), 33);
        assert_eq!(rounded_percent(2, 3), 67);
        assert_eq!(rounded_percent(1, 8), 13);
        assert_eq!(rounded_percent(1, 200), 1);
        assert_eq!(rounded_percent(1, 201), 0);
        assert_eq!(rounded_percent(5, 5), 100);
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_value(Stats::of(&collection(1, 3))).unwrap();
        assert_eq!(json["completion_rate_percent"], 25);
        assert_eq!(json["active_count"], 3);
    }
}
