//! Domain types for the classroom registry.
//!
//! All types are serializable via serde. Timestamps are `DateTime<Utc>` and
//! render as RFC3339 strings.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Opaque identifier of a class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId(pub String);

impl ClassId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ClassId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ClassId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Opaque identifier of a task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    #[default]
    Open,
    Closed,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskState::Open => write!(f, "open"),
            TaskState::Closed => write!(f, "closed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A class that tasks are assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    pub id: ClassId,
    pub class_name: String,
    pub teacher: String,
}

/// A unit of work belonging to exactly one class.
///
/// `is_closed` and `closed_at` only change through [`Task::close`] and
/// [`Task::reopen`], which keep them in step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub class_id: ClassId,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
    pub is_closed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn state(&self) -> TaskState {
        if self.is_closed {
            TaskState::Closed
        } else {
            TaskState::Open
        }
    }

    /// Move to `Closed`, stamping `now`. Returns `false` (and keeps the
    /// original `closed_at`) when the task is already closed.
    pub fn close(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_closed {
            return false;
        }
        self.is_closed = true;
        self.closed_at = Some(now);
        true
    }

    /// Move to `Open`. Returns `false` when the task is already open.
    pub fn reopen(&mut self) -> bool {
        if !self.is_closed {
            return false;
        }
        self.is_closed = false;
        self.closed_at = None;
        true
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Caller-supplied fields for creating or updating a class.
///
/// Missing JSON fields deserialize as empty strings and are rejected by
/// validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInput {
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub teacher: String,
}

impl ClassInput {
    pub fn new(class_name: impl Into<String>, teacher: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            teacher: teacher.into(),
        }
    }
}

/// Caller-supplied fields for creating or updating a task.
///
/// `due_at` is an RFC3339 string; `None` or a blank string means "no due date".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInput {
    #[serde(default)]
    pub class_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<String>,
}

impl TaskInput {
    pub fn new(class_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            class_id: class_id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn due_at(mut self, due_at: impl Into<String>) -> Self {
        self.due_at = Some(due_at.into());
        self
    }
}

/// Consistent view of both collections, taken under both read locks.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    pub classes: Vec<Class>,
    pub tasks: Vec<Task>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
