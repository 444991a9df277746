//! The registry: both collections plus the locking discipline that ties them.
//!
//! # Lock order
//!
//! ```text
//! class lock  ──►  task lock        (acquire)
//! task lock   ──►  class lock       (release, reverse order)
//! ```
//!
//! Any operation that touches both collections takes the class lock first and
//! keeps it until the task lock is released. Nothing ever asks for the class
//! lock while holding the task lock. Collaborator calls (id allocation, the
//! clock) are never made while a lock is held.
//!
//! | Operation              | class lock | task lock |
//! |------------------------|------------|-----------|
//! | create/update class    | write      | –         |
//! | delete class           | write      | write     |
//! | create/update task     | read       | write     |
//! | list tasks by class    | read       | read      |
//! | snapshot / stats       | read       | read      |
//! | close/open/delete task | –          | write     |

use std::sync::Arc;

use serde::Serialize;

use crate::classes::{self, ClassGuard, ClassRegistry};
use crate::clock::{Clock, SystemClock};
use crate::error::RegistryError;
use crate::id::{IdSource, RandomIdSource};
use crate::tasks::{self, TaskFields, TaskRegistry};
use crate::types::{Class, ClassId, ClassInput, Snapshot, Task, TaskId, TaskInput};

/// Counts taken under both read locks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub classes: usize,
    pub tasks: usize,
    pub open_tasks: usize,
    pub closed_tasks: usize,
}

/// In-memory registry of classes and tasks. Share it behind an `Arc`.
pub struct Registry {
    classes: ClassRegistry,
    tasks: TaskRegistry,
    ids: Arc<dyn IdSource>,
    clock: Arc<dyn Clock>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Registry backed by OS randomness and wall-clock time.
    pub fn new() -> Self {
        Self::with_sources(Arc::new(RandomIdSource), Arc::new(SystemClock))
    }

    pub fn with_sources(ids: Arc<dyn IdSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            classes: ClassRegistry::new(),
            tasks: TaskRegistry::new(),
            ids,
            clock,
        }
    }

    // -----------------------------------------------------------------------
    // Classes
    // -----------------------------------------------------------------------

    pub fn create_class(&self, input: ClassInput) -> Result<Class, RegistryError> {
        classes::validate(&input)?;
        let id = ClassId::from(self.ids.next_id()?);
        let class = Class {
            id,
            class_name: input.class_name,
            teacher: input.teacher,
        };

        let class = self.classes.write().insert(class)?;
        tracing::debug!(class_id = %class.id, "class created");
        Ok(class)
    }

    pub fn get_class(&self, id: &ClassId) -> Result<Class, RegistryError> {
        self.classes.get(id)
    }

    pub fn list_classes(&self) -> Vec<Class> {
        self.classes.list()
    }

    pub fn update_class(&self, id: &ClassId, input: ClassInput) -> Result<Class, RegistryError> {
        classes::validate(&input)?;
        let class = self.classes.write().update(id, input)?;
        tracing::debug!(class_id = %id, "class updated");
        Ok(class)
    }

    /// Remove a class and all of its tasks in one step.
    ///
    /// The class write lock is held from the existence check until both
    /// removals are done, so no task of this class can be created meanwhile
    /// and no reader taking locks in order sees a partial cascade.
    pub fn delete_class(&self, id: &ClassId) -> Result<(), RegistryError> {
        let mut classes = self.classes.write();
        if !classes.contains(id) {
            return Err(RegistryError::class_not_found(id));
        }

        let mut tasks = self.tasks.write();
        let removed = tasks.remove_by_class(&classes, id);
        classes.remove(id)?;
        drop(tasks);
        drop(classes);

        tracing::info!(class_id = %id, removed_tasks = removed, "class deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    /// Create an open task. The class read lock covers both the existence
    /// check and the insert.
    pub fn create_task(&self, input: TaskInput) -> Result<Task, RegistryError> {
        let fields = self.task_fields(input)?;
        let id = TaskId::from(self.ids.next_id()?);
        let task = Task {
            id,
            class_id: fields.class_id,
            title: fields.title,
            description: fields.description,
            due_at: fields.due_at,
            is_closed: false,
            closed_at: None,
        };

        let classes = self.classes.read();
        let task = self.tasks.write().insert(&classes, task)?;
        drop(classes);

        tracing::debug!(task_id = %task.id, class_id = %task.class_id, "task created");
        Ok(task)
    }

    pub fn get_task(&self, id: &TaskId) -> Result<Task, RegistryError> {
        self.tasks.get(id)
    }

    pub fn list_tasks(&self) -> Vec<Task> {
        self.tasks.list()
    }

    /// Tasks of one class; `NotFound` names the class when it is absent.
    pub fn list_tasks_by_class(&self, class_id: &ClassId) -> Result<Vec<Task>, RegistryError> {
        let classes = self.classes.read();
        let tasks = self.tasks.read();
        tasks.list_by_class(&classes, class_id)
    }

    /// Replace the editable fields of a task, re-checking its class under the
    /// class read lock.
    pub fn update_task(&self, id: &TaskId, input: TaskInput) -> Result<Task, RegistryError> {
        let fields = self.task_fields(input)?;

        let classes = self.classes.read();
        let task = self.tasks.write().update(&classes, id, fields)?;
        drop(classes);

        tracing::debug!(task_id = %id, class_id = %task.class_id, "task updated");
        Ok(task)
    }

    /// Validate in caller-visible order: required fields, class reference,
    /// then `due_at`. The class check here only decides which error wins;
    /// the insert or update re-checks it under the class lock.
    fn task_fields(&self, input: TaskInput) -> Result<TaskFields, RegistryError> {
        tasks::check_required(&input)?;
        if !self.classes.exists(&ClassId::from(input.class_id.as_str())) {
            return Err(tasks::unknown_class());
        }
        tasks::validate(input)
    }

    pub fn close_task(&self, id: &TaskId) -> Result<Task, RegistryError> {
        let now = self.clock.now();
        let (task, changed) = self.tasks.write().close(id, now)?;
        if changed {
            tracing::debug!(task_id = %id, closed_at = %now, "task closed");
        }
        Ok(task)
    }

    pub fn open_task(&self, id: &TaskId) -> Result<Task, RegistryError> {
        let (task, changed) = self.tasks.write().reopen(id)?;
        if changed {
            tracing::debug!(task_id = %id, "task reopened");
        }
        Ok(task)
    }

    pub fn delete_task(&self, id: &TaskId) -> Result<(), RegistryError> {
        self.tasks.write().remove(id)?;
        tracing::debug!(task_id = %id, "task deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Consistent reads
    // -----------------------------------------------------------------------

    /// Both collections as of one instant.
    pub fn snapshot(&self) -> Snapshot {
        let classes = self.classes.read();
        let tasks = self.tasks.read();
        Snapshot {
            classes: classes.list(),
            tasks: tasks.list(),
        }
    }

    pub fn stats(&self) -> RegistryStats {
        let classes = self.classes.read();
        let tasks = self.tasks.read();
        let closed = tasks.count_closed();
        RegistryStats {
            classes: classes.len(),
            tasks: tasks.len(),
            open_tasks: tasks.len() - closed,
            closed_tasks: closed,
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::{ErrorKind, IdError};
    use chrono::{Duration, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct BrokenIds;

    impl IdSource for BrokenIds {
        fn next_id(&self) -> Result<String, IdError> {
            Err(IdError("entropy source unavailable".to_string()))
        }
    }

    /// Hands out `remaining` ids, then fails.
    struct FailingAfter {
        remaining: AtomicUsize,
    }

    impl FailingAfter {
        fn new(remaining: usize) -> Self {
            Self {
                remaining: AtomicUsize::new(remaining),
            }
        }
    }

    impl IdSource for FailingAfter {
        fn next_id(&self) -> Result<String, IdError> {
            let left = self.remaining.load(Ordering::SeqCst);
            if left == 0 {
                return BrokenIds.next_id();
            }
            self.remaining.store(left - 1, Ordering::SeqCst);
            RandomIdSource.next_id()
        }
    }

    fn registry_with_clock() -> (Registry, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let registry = Registry::with_sources(Arc::new(RandomIdSource), clock.clone());
        (registry, clock)
    }

    #[test]
    fn id_failure_is_internal_and_stores_nothing() {
        let registry = Registry::with_sources(Arc::new(BrokenIds), Arc::new(SystemClock));
        let err = registry
            .create_class(ClassInput::new("Algorithms", "Ada"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(registry.list_classes().is_empty());
    }

    #[test]
    fn validation_runs_before_id_allocation() {
        let registry = Registry::with_sources(Arc::new(BrokenIds), Arc::new(SystemClock));
        let err = registry.create_class(ClassInput::new("", "Ada")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn task_id_failure_is_internal_and_stores_nothing() {
        let registry =
            Registry::with_sources(Arc::new(FailingAfter::new(1)), Arc::new(SystemClock));
        let class = registry
            .create_class(ClassInput::new("Algorithms", "Ada"))
            .expect("class gets the only id");
        let err = registry
            .create_task(TaskInput::new(class.id.as_str(), "HW1"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(registry.list_tasks().is_empty());
    }

    #[test]
    fn unknown_class_wins_over_id_failure_and_bad_due_at() {
        let registry = Registry::with_sources(Arc::new(BrokenIds), Arc::new(SystemClock));
        let err = registry
            .create_task(TaskInput::new("no-such-class", "HW1").due_at("someday"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.to_string(), "class not found");

        let err = registry
            .create_task(TaskInput::new("", "HW1").due_at("someday"))
            .unwrap_err();
        assert_eq!(err.to_string(), "class_id and title are required");
    }

    #[test]
    fn update_checks_class_before_due_at_and_task() {
        let (registry, _clock) = registry_with_clock();
        let class = registry
            .create_class(ClassInput::new("Algorithms", "Ada"))
            .expect("class");
        let task = registry
            .create_task(TaskInput::new(class.id.as_str(), "HW1"))
            .expect("task");

        let err = registry
            .update_task(&task.id, TaskInput::new("gone", "HW1").due_at("someday"))
            .unwrap_err();
        assert_eq!(err.to_string(), "class not found");

        let err = registry
            .update_task(&task.id, TaskInput::new(class.id.as_str(), "HW1").due_at("someday"))
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid due_at (use RFC3339)");

        let err = registry
            .update_task(&TaskId::from("missing"), TaskInput::new(class.id.as_str(), "HW1"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn close_stamps_clock_time_once() {
        let (registry, clock) = registry_with_clock();
        let class = registry
            .create_class(ClassInput::new("Algorithms", "Ada"))
            .expect("class");
        let task = registry
            .create_task(TaskInput::new(class.id.as_str(), "HW1"))
            .expect("task");

        let t0 = clock.now();
        let first = registry.close_task(&task.id).expect("close");
        clock.advance(Duration::minutes(10));
        let second = registry.close_task(&task.id).expect("close again");

        assert_eq!(first.closed_at, Some(t0));
        assert_eq!(second.closed_at, Some(t0));
    }

    #[test]
    fn stats_count_open_and_closed() {
        let (registry, _clock) = registry_with_clock();
        let class = registry
            .create_class(ClassInput::new("Algorithms", "Ada"))
            .expect("class");
        let a = registry
            .create_task(TaskInput::new(class.id.as_str(), "HW1"))
            .expect("a");
        registry
            .create_task(TaskInput::new(class.id.as_str(), "HW2"))
            .expect("b");
        registry.close_task(&a.id).expect("close");

        let stats = registry.stats();
        assert_eq!(
            stats,
            RegistryStats {
                classes: 1,
                tasks: 2,
                open_tasks: 1,
                closed_tasks: 1,
            }
        );
    }
}
