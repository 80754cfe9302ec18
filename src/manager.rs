//! Task state manager
//!
//! The manager owns the in-memory [`TaskCollection`] and is its only
//! writer. Each mutation is applied to memory first and then saved whole
//! through the [`PersistentStore`]; a failed save is reported in the
//! returned [`Outcome`] but never undoes the change, so memory stays the
//! source of truth.
//!
//! Blank text and unknown IDs are not errors. They come back as
//! [`Change::Ignored`] and nothing is written.
//!
//! The manager is not thread-safe and assumes one caller at a time.

use chrono::{DateTime, Utc};

use crate::domain::{normalize_text, FilterMode, Stats, Task, TaskCollection, TaskId};
use crate::storage::{KeyValueStore, LoadWarning, PersistentStore, StorageError};

/// Why a mutation left the collection untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoopReason {
    /// The text was empty after trimming
    BlankText,
    /// No task has the given ID
    NotFound,
}

/// What a mutation did to the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Applied,
    Ignored(NoopReason),
}

/// What happened when saving after a mutation
#[derive(Debug)]
pub enum Persistence {
    Saved,
    /// Nothing changed, so nothing was written
    Skipped,
    Failed(StorageError),
}

impl Persistence {
    /// Returns the save error, if any
    pub fn error(&self) -> Option<&StorageError> {
        match self {
            Persistence::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Result of one mutation
#[derive(Debug)]
pub struct Outcome<'a> {
    pub change: Change,
    pub persistence: Persistence,
    /// The collection after the mutation
    pub tasks: &'a TaskCollection,
}

impl Outcome<'_> {
    /// Returns true if the collection changed
    pub fn is_applied(&self) -> bool {
        self.change == Change::Applied
    }
}

/// Owner of the task list and its persistence
pub struct TaskStateManager<S: KeyValueStore> {
    tasks: TaskCollection,
    store: PersistentStore<S>,
    key: String,
    load_warning: Option<LoadWarning>,
    clock: fn() -> DateTime<Utc>,
}

impl<S: KeyValueStore> TaskStateManager<S> {
    /// Opens the list stored under `key`, seeding memory from `backend`
    ///
    /// Never fails: unreadable or corrupt data starts an empty list and the
    /// reason is kept in [`load_warning`](Self::load_warning).
    pub fn open(backend: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let store = PersistentStore::new(backend);
        let loaded = store.load(&key);
        Self {
            tasks: loaded.tasks,
            store,
            key,
            load_warning: loaded.warning,
            clock: Utc::now,
        }
    }

    /// Replaces the clock used to allocate IDs
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the storage key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the persistence bridge
    pub fn store(&self) -> &PersistentStore<S> {
        &self.store
    }

    /// Returns why the initial load fell back to an empty list, if it did
    pub fn load_warning(&self) -> Option<&LoadWarning> {
        self.load_warning.as_ref()
    }

    /// Returns the current collection
    pub fn tasks(&self) -> &TaskCollection {
        &self.tasks
    }

    /// Looks up a task by ID
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// Appends a task with the trimmed `text`
    pub fn add(&mut self, text: &str) -> Outcome<'_> {
        let now = (self.clock)();
        match self.tasks.push_text(text, now) {
            Some(id) => {
                tracing::debug!(%id, "added task");
                self.applied()
            }
            None => self.ignored(NoopReason::BlankText),
        }
    }

    /// Flips completion of the task with `id`
    pub fn toggle(&mut self, id: TaskId) -> Outcome<'_> {
        if self.tasks.toggle(id) {
            tracing::debug!(%id, "toggled task");
            self.applied()
        } else {
            self.ignored(NoopReason::NotFound)
        }
    }

    /// Deletes the task with `id`
    pub fn remove(&mut self, id: TaskId) -> Outcome<'_> {
        if self.tasks.remove(id) {
            tracing::debug!(%id, "removed task");
            self.applied()
        } else {
            self.ignored(NoopReason::NotFound)
        }
    }

    /// Replaces the text of the task with `id`
    ///
    /// Blank text is ignored so a task can never be emptied.
    pub fn edit(&mut self, id: TaskId, new_text: &str) -> Outcome<'_> {
        let Some(text) = normalize_text(new_text) else {
            return self.ignored(NoopReason::BlankText);
        };
        if self.tasks.set_text(id, text) {
            tracing::debug!(%id, "edited task");
            self.applied()
        } else {
            self.ignored(NoopReason::NotFound)
        }
    }

    /// Iterates the tasks selected by `mode`, in creation order
    pub fn filtered_view(&self, mode: FilterMode) -> impl Iterator<Item = &Task> + Clone + '_ {
        mode.apply(&self.tasks)
    }

    /// Computes aggregate counts for the whole collection
    pub fn stats(&self) -> Stats {
        Stats::of(&self.tasks)
    }

    /// Replaces memory with a fresh load of the stored list
    ///
    /// Picks up writes made by another process. Local changes that were
    /// never saved are dropped. If the backend cannot be read, memory is
    /// kept as is so a later save cannot overwrite the stored list with
    /// an empty one.
    pub fn reload(&mut self) -> Option<&LoadWarning> {
        let loaded = self.store.load(&self.key);
        match loaded.warning {
            Some(LoadWarning::Unavailable(_)) => {
                tracing::warn!(key = %self.key, "reload failed; keeping tasks in memory");
            }
            _ => self.tasks = loaded.tasks,
        }
        self.load_warning = loaded.warning;
        self.load_warning.as_ref()
    }

    /// Saves the current collection, e.g. to retry after a failure
    pub fn save(&self) -> Result<(), StorageError> {
        self.store.save(&self.key, &self.tasks)
    }

    fn applied(&self) -> Outcome<'_> {
        let persistence = match self.save() {
            Ok(()) => Persistence::Saved,
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "failed to save tasks; keeping changes in memory");
                Persistence::Failed(err)
            }
        };
        Outcome {
            change: Change::Applied,
            persistence,
            tasks: &self.tasks,
        }
    }

    fn ignored(&self, reason: NoopReason) -> Outcome<'_> {
        tracing::debug!(?reason, "mutation ignored");
        Outcome {
            change: Change::Ignored(reason),
            persistence: Persistence::Skipped,
            tasks: &self.tasks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;

    const KEY: &str = "todos";

    fn fixed_clock() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
    }

    fn manager() -> (TaskStateManager<MemoryStore>, MemoryStore) {
        let backend = MemoryStore::new();
        let manager = TaskStateManager::open(backend.clone(), KEY).with_clock(fixed_clock);
        (manager, backend)
    }

    fn id_of(manager: &TaskStateManager<MemoryStore>, text: &str) -> TaskId {
        manager.tasks().iter().find(|t| t.text == text).unwrap().id
    }

    #[test]
    fn add_appends_and_saves() {
        let (mut manager, backend) = manager();

        let outcome = manager.add("  Buy milk ");
        assert!(outcome.is_applied());
        assert!(matches!(outcome.persistence, Persistence::Saved));
        assert_eq!(outcome.tasks.len(), 1);

        let task = &manager.tasks().as_slice()[0];
        assert_eq!(task.text, "Buy milk");
        assert!(!task.completed);
        assert!(backend.raw(KEY).unwrap().contains("Buy milk"));
    }

    #[test]
    fn blank_add_is_ignored_and_not_saved() {
        let (mut manager, backend) = manager();

        let outcome = manager.add("   ");
        assert_eq!(outcome.change, Change::Ignored(NoopReason::BlankText));
        assert!(matches!(outcome.persistence, Persistence::Skipped));
        assert!(manager.tasks().is_empty());
        assert!(backend.raw(KEY).is_none());
    }

    #[test]
    fn toggle_twice_restores_flag() {
        let (mut manager, _) = manager();
        manager.add("Buy milk");
        let id = id_of(&manager, "Buy milk");

        manager.toggle(id);
        assert!(manager.get(id).unwrap().completed);
        manager.toggle(id);
        assert!(!manager.get(id).unwrap().completed);
    }

    #[test]
    fn unknown_id_is_ignored() {
        let (mut manager, _) = manager();
        manager.add("Buy milk");
        let before = manager.tasks().clone();
        let missing = TaskId::new(1);

        assert_eq!(
            manager.toggle(missing).change,
            Change::Ignored(NoopReason::NotFound)
        );
        assert_eq!(
            manager.remove(missing).change,
            Change::Ignored(NoopReason::NotFound)
        );
        assert_eq!(
            manager.edit(missing, "x").change,
            Change::Ignored(NoopReason::NotFound)
        );
        assert_eq!(manager.tasks(), &before);
    }

    #[test]
    fn remove_is_idempotent() {
        let (mut manager, _) = manager();
        manager.add("a");
        manager.add("b");
        let id = id_of(&manager, "a");

        assert!(manager.remove(id).is_applied());
        assert!(!manager.remove(id).is_applied());
        assert_eq!(manager.tasks().len(), 1);
    }

    #[test]
    fn edit_updates_text_in_place() {
        let (mut manager, _) = manager();
        manager.add("a");
        manager.add("b");
        let id = id_of(&manager, "a");
        manager.toggle(id);

        assert!(manager.edit(id, "  alpha ").is_applied());

        let first = &manager.tasks().as_slice()[0];
        assert_eq!(first.id, id);
        assert_eq!(first.text, "alpha");
        assert!(first.completed);
    }

    #[test]
    fn blank_edit_keeps_task() {
        let (mut manager, _) = manager();
        manager.add("keep me");
        let id = id_of(&manager, "keep me");

        for blank in ["", "   "] {
            let outcome = manager.edit(id, blank);
            assert_eq!(outcome.change, Change::Ignored(NoopReason::BlankText));
        }
        assert_eq!(manager.get(id).unwrap().text, "keep me");
    }

    #[test]
    fn buy_milk_walk_dog_scenario() {
        let (mut manager, _) = manager();
        manager.add("Buy milk");
        manager.add("Walk dog");
        let milk = id_of(&manager, "Buy milk");
        manager.toggle(milk);

        let completed: Vec<_> = manager.filtered_view(FilterMode::Completed).collect();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].text, "Buy milk");
        assert!(completed[0].completed);

        assert_eq!(
            manager.stats(),
            Stats {
                total: 2,
                completed_count: 1,
                active_count: 1,
                completion_rate_percent: 50,
            }
        );
    }

    #[test]
    fn state_survives_reopen() {
        let (mut manager, backend) = manager();
        manager.add("Buy milk");
        let id = id_of(&manager, "Buy milk");
        manager.toggle(id);

        let reopened = TaskStateManager::open(backend, KEY);
        assert_eq!(reopened.tasks(), manager.tasks());
        assert!(reopened.load_warning().is_none());
    }

    #[test]
    fn corrupt_store_starts_empty_with_warning() {
        let backend = MemoryStore::new();
        backend.insert_raw(KEY, "\u{0}garbage");

        let manager = TaskStateManager::open(backend, KEY);
        assert!(manager.tasks().is_empty());
        assert!(matches!(
            manager.load_warning(),
            Some(LoadWarning::CorruptData(_))
        ));
    }

    #[test]
    fn failed_save_keeps_change_in_memory() {
        let (mut manager, backend) = manager();
        backend.set_unavailable(true);

        let outcome = manager.add("offline task");
        assert!(outcome.is_applied());
        assert!(matches!(
            outcome.persistence.error(),
            Some(StorageError::Unavailable(_))
        ));
        assert_eq!(manager.tasks().len(), 1);

        backend.set_unavailable(false);
        manager.save().unwrap();
        assert!(backend.raw(KEY).unwrap().contains("offline task"));
    }

    #[test]
    fn quota_failure_is_reported() {
        let backend = MemoryStore::with_quota(64);
        let mut manager = TaskStateManager::open(backend, KEY).with_clock(fixed_clock);

        let outcome = manager.add(&"x".repeat(100));
        assert!(matches!(
            outcome.persistence.error(),
            Some(StorageError::QuotaExceeded { .. })
        ));
        assert_eq!(manager.tasks().len(), 1);
    }

    #[test]
    fn last_save_wins_across_managers() {
        let backend = MemoryStore::new();
        let mut tab_a = TaskStateManager::open(backend.clone(), KEY).with_clock(fixed_clock);
        let mut tab_b = TaskStateManager::open(backend.clone(), KEY).with_clock(fixed_clock);

        tab_a.add("from a");
        tab_b.add("from b");

        let fresh = TaskStateManager::open(backend, KEY);
        let texts: Vec<_> = fresh.tasks().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["from b"]);

        tab_a.reload();
        assert_eq!(tab_a.tasks(), fresh.tasks());
    }

    #[test]
    fn reload_reports_new_corruption() {
        let (mut manager, backend) = manager();
        manager.add("a");
        backend.insert_raw(KEY, "[1, 2, 3]");

        assert!(matches!(manager.reload(), Some(LoadWarning::CorruptData(_))));
        assert!(manager.tasks().is_empty());
    }

    #[test]
    fn reload_with_unreadable_store_keeps_memory() {
        let (mut manager, backend) = manager();
        manager.add("a");
        manager.add("b");
        manager.add("c");
        let before = manager.tasks().clone();

        backend.set_unavailable(true);
        assert!(matches!(manager.reload(), Some(LoadWarning::Unavailable(_))));
        assert_eq!(manager.tasks(), &before);

        backend.set_unavailable(false);
        manager.add("d");
        let texts: Vec<_> = TaskStateManager::open(backend, KEY)
            .tasks()
            .iter()
            .map(|t| t.text.clone())
            .collect();
        assert_eq!(texts, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn filtered_view_is_repeatable() {
        let (mut manager, _) = manager();
        manager.add("a");
        manager.add("b");
        let id = id_of(&manager, "b");
        manager.toggle(id);

        let first: Vec<_> = manager.filtered_view(FilterMode::Active).cloned().collect();
        let second: Vec<_> = manager.filtered_view(FilterMode::Active).cloned().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].text, "a");
    }
}
