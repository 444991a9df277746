//! The task collection, its field validation and the open/closed transitions.
//!
//! Operations that depend on a class existing take a [`ClassGuard`], so they
//! can only run while the caller still holds the class lock.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::classes::{ClassGuard, ClassesWrite};
use crate::error::RegistryError;
use crate::types::{ClassId, Task, TaskId, TaskInput};

type TaskMap = HashMap<TaskId, Task>;

/// Owner of all tasks.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: RwLock<TaskMap>,
}

/// Shared access to the task map.
pub struct TasksRead<'a> {
    tasks: RwLockReadGuard<'a, TaskMap>,
}

/// Exclusive access to the task map.
pub struct TasksWrite<'a> {
    tasks: RwLockWriteGuard<'a, TaskMap>,
}

/// Validated task fields, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFields {
    pub class_id: ClassId,
    pub title: String,
    pub description: String,
    pub due_at: Option<DateTime<Utc>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn read(&self) -> TasksRead<'_> {
        TasksRead {
            tasks: self.tasks.read(),
        }
    }

    pub(crate) fn write(&self) -> TasksWrite<'_> {
        TasksWrite {
            tasks: self.tasks.write(),
        }
    }

    pub fn get(&self, id: &TaskId) -> Result<Task, RegistryError> {
        self.read().get(id).cloned()
    }

    pub fn list(&self) -> Vec<Task> {
        self.read().list()
    }
}

impl TasksRead<'_> {
    pub fn get(&self, id: &TaskId) -> Result<&Task, RegistryError> {
        self.tasks
            .get(id)
            .ok_or_else(|| RegistryError::task_not_found(id))
    }

    pub fn list(&self) -> Vec<Task> {
        self.tasks.values().cloned().collect()
    }

    /// Tasks of one class. The class must exist under the held class lock.
    pub fn list_by_class(
        &self,
        classes: &impl ClassGuard,
        class_id: &ClassId,
    ) -> Result<Vec<Task>, RegistryError> {
        if !classes.contains(class_id) {
            return Err(RegistryError::class_not_found(class_id));
        }
        Ok(self
            .tasks
            .values()
            .filter(|task| task.class_id == *class_id)
            .cloned()
            .collect())
    }

    pub fn count_closed(&self) -> usize {
        self.tasks.values().filter(|task| task.is_closed).count()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }
}

impl TasksWrite<'_> {
    /// Store a new task after confirming its class exists.
    pub fn insert(
        &mut self,
        classes: &impl ClassGuard,
        task: Task,
    ) -> Result<Task, RegistryError> {
        require_class(classes, &task.class_id)?;
        if self.tasks.contains_key(&task.id) {
            return Err(RegistryError::Internal(format!(
                "identifier collision on task {}",
                task.id
            )));
        }
        self.tasks.insert(task.id.clone(), task.clone());
        Ok(task)
    }

    /// Replace the editable fields of a task. The class reference is checked
    /// again even when unchanged; lifecycle fields are left alone.
    pub fn update(
        &mut self,
        classes: &impl ClassGuard,
        id: &TaskId,
        fields: TaskFields,
    ) -> Result<Task, RegistryError> {
        require_class(classes, &fields.class_id)?;
        let task = self
            .tasks
            .get_mut(id)
            .ok_or_else(|| RegistryError::task_not_found(id))?;
        task.class_id = fields.class_id;
        task.title = fields.title;
        task.description = fields.description;
        task.due_at = fields.due_at;
        Ok(task.clone())
    }

    /// Open -> Closed. Closing a closed task keeps its original `closed_at`.
    pub fn close(&mut self, id: &TaskId, now: DateTime<Utc>) -> Result<(Task, bool), RegistryError> {
        let task = self
            .tasks
            .get_mut(id)
            .ok_or_else(|| RegistryError::task_not_found(id))?;
        let changed = task.close(now);
        Ok((task.clone(), changed))
    }

    /// Closed -> Open. Opening an open task is a no-op.
    pub fn reopen(&mut self, id: &TaskId) -> Result<(Task, bool), RegistryError> {
        let task = self
            .tasks
            .get_mut(id)
            .ok_or_else(|| RegistryError::task_not_found(id))?;
        let changed = task.reopen();
        Ok((task.clone(), changed))
    }

    pub fn remove(&mut self, id: &TaskId) -> Result<Task, RegistryError> {
        self.tasks
            .remove(id)
            .ok_or_else(|| RegistryError::task_not_found(id))
    }

    /// Drop every task of `class_id`. Needs the class write lock so no task
    /// of the class can be inserted concurrently.
    pub fn remove_by_class(&mut self, _classes: &ClassesWrite<'_>, class_id: &ClassId) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|_, task| task.class_id != *class_id);
        before - self.tasks.len()
    }
}

fn require_class(classes: &impl ClassGuard, class_id: &ClassId) -> Result<(), RegistryError> {
    if classes.contains(class_id) {
        Ok(())
    } else {
        Err(unknown_class())
    }
}

/// A task referencing a class that does not exist is a caller error.
pub(crate) fn unknown_class() -> RegistryError {
    RegistryError::invalid("class not found")
}

/// `class_id` and `title` must be non-blank.
pub fn check_required(input: &TaskInput) -> Result<(), RegistryError> {
    if input.class_id.trim().is_empty() || input.title.trim().is_empty() {
        return Err(RegistryError::invalid("class_id and title are required"));
    }
    Ok(())
}

/// Check required fields and parse `due_at`. Values are stored untrimmed.
pub fn validate(input: TaskInput) -> Result<TaskFields, RegistryError> {
    check_required(&input)?;
    let due_at = parse_due_at(input.due_at.as_deref())?;
    Ok(TaskFields {
        class_id: ClassId::from(input.class_id),
        title: input.title,
        description: input.description,
        due_at,
    })
}

/// Parse an optional RFC3339 timestamp. Absent or blank means no due date.
pub fn parse_due_at(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, RegistryError> {
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|_| RegistryError::invalid("invalid due_at (use RFC3339)")),
    }
}
