//! Task CLI commands
//!
//! Each invocation opens the stored list, runs one operation against the
//! manager and reports the result.

use anyhow::Result;

use super::output::Output;
use crate::domain::{FilterMode, Task, TaskId};
use crate::manager::{Change, NoopReason, Outcome, TaskStateManager};
use crate::storage::KeyValueStore;

fn describe_noop(reason: NoopReason, id: Option<TaskId>) -> String {
    match (reason, id) {
        (NoopReason::BlankText, _) => "Text is blank; nothing changed".to_string(),
        (NoopReason::NotFound, Some(id)) => format!("No task with ID {}; nothing changed", id),
        (NoopReason::NotFound, None) => "No such task; nothing changed".to_string(),
    }
}

fn checkbox(task: &Task) -> &'static str {
    if task.completed {
        "[x]"
    } else {
        "[ ]"
    }
}

/// Reports a mutation and turns a failed save into an error
fn report(output: &Output, outcome: Outcome<'_>, id: Option<TaskId>, done: &str) -> Result<()> {
    match outcome.change {
        Change::Ignored(reason) => {
            output.notice(&describe_noop(reason, id));
            return Ok(());
        }
        Change::Applied => {}
    }

    if let Some(err) = outcome.persistence.error() {
        anyhow::bail!("{} in memory, but changes were not saved: {}", done, err);
    }

    if output.is_json() {
        let task = id.and_then(|id| outcome.tasks.get(id));
        output.data(&serde_json::json!({
            "success": true,
            "changed": true,
            "task": task,
            "count": outcome.tasks.len(),
        }));
    } else {
        output.success(done);
    }

    Ok(())
}

pub fn add<S: KeyValueStore>(
    manager: &mut TaskStateManager<S>,
    output: &Output,
    text: &str,
) -> Result<()> {
    output.verbose_ctx("add", &format!("Adding task: {:?}", text));
    let outcome = manager.add(text);
    let created = match outcome.change {
        Change::Applied => outcome.tasks.iter().last().map(|t| (t.id, t.text.clone())),
        Change::Ignored(_) => None,
    };

    match created {
        Some((id, text)) => report(output, outcome, Some(id), &format!("Added task {}: {}", id, text)),
        None => report(output, outcome, None, "Added task"),
    }
}

pub fn toggle<S: KeyValueStore>(
    manager: &mut TaskStateManager<S>,
    output: &Output,
    id: TaskId,
) -> Result<()> {
    output.verbose_ctx("toggle", &format!("Toggling task {}", id));
    let outcome = manager.toggle(id);
    let message = match outcome.tasks.get(id) {
        Some(task) if task.completed => format!("Completed task {}: {}", id, task.text),
        Some(task) => format!("Reopened task {}: {}", id, task.text),
        None => String::new(),
    };
    report(output, outcome, Some(id), &message)
}

pub fn remove<S: KeyValueStore>(
    manager: &mut TaskStateManager<S>,
    output: &Output,
    id: TaskId,
) -> Result<()> {
    output.verbose_ctx("rm", &format!("Removing task {}", id));
    let outcome = manager.remove(id);
    report(output, outcome, Some(id), &format!("Removed task {}", id))
}

pub fn edit<S: KeyValueStore>(
    manager: &mut TaskStateManager<S>,
    output: &Output,
    id: TaskId,
    text: &str,
) -> Result<()> {
    output.verbose_ctx("edit", &format!("Editing task {}: {:?}", id, text));
    let outcome = manager.edit(id, text);
    let message = outcome
        .tasks
        .get(id)
        .map(|task| format!("Updated task {}: {}", id, task.text))
        .unwrap_or_default();
    report(output, outcome, Some(id), &message)
}

pub fn list<S: KeyValueStore>(
    manager: &TaskStateManager<S>,
    output: &Output,
    filter: FilterMode,
) -> Result<()> {
    output.verbose_ctx("list", &format!("Listing with filter: {}", filter));
    let view: Vec<&Task> = manager.filtered_view(filter).collect();

    if output.is_json() {
        output.data(&view);
    } else if view.is_empty() {
        match filter {
            FilterMode::All => output.line("No tasks yet. Add one with `tasklist add <TEXT>`"),
            FilterMode::Active => output.line("No active tasks"),
            FilterMode::Completed => output.line("No completed tasks"),
        }
    } else {
        output.line(&format!("{:<16} {:<4} TEXT", "ID", ""));
        output.line(&"-".repeat(60));
        for task in view {
            output.line(&format!("{:<16} {:<4} {}", task.id, checkbox(task), task.text));
        }
    }

    Ok(())
}

pub fn stats<S: KeyValueStore>(manager: &TaskStateManager<S>, output: &Output) -> Result<()> {
    let stats = manager.stats();

    if output.is_json() {
        output.data(&stats);
    } else {
        output.line(&format!("Total:     {}", stats.total));
        output.line(&format!("Completed: {}", stats.completed_count));
        output.line(&format!("Active:    {}", stats.active_count));
        output.line(&format!("Complete:  {}%", stats.completion_rate_percent));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_messages() {
        assert_eq!(
            describe_noop(NoopReason::NotFound, Some(TaskId::new(7))),
            "No task with ID 7; nothing changed"
        );
        assert!(describe_noop(NoopReason::BlankText, None).contains("blank"));
    }

    #[test]
    fn checkbox_marks_completed() {
        let mut task = Task::new(TaskId::new(1), "a");
        assert_eq!(checkbox(&task), "[ ]");
        task.toggle();
        assert_eq!(checkbox(&task), "[x]");
    }
}
