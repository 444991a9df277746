//! Classroom core library: domain types, errors, and the concurrent registry.
//!
//! Public API surface:
//! - [`types`]: newtypes, domain structs, caller inputs
//! - [`error`]: [`RegistryError`] and its [`ErrorKind`]
//! - [`registry`]: [`Registry`], the entry point for every operation
//! - [`classes`] / [`tasks`]: the two collections and their validation
//! - [`id`] / [`clock`]: injected identifier and time sources

pub mod classes;
pub mod clock;
pub mod error;
pub mod id;
pub mod registry;
pub mod tasks;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Entity, ErrorKind, IdError, RegistryError};
pub use id::{IdSource, RandomIdSource};
pub use registry::{Registry, RegistryStats};
pub use types::{
    Class, ClassId, ClassInput, Snapshot, Task, TaskId, TaskInput, TaskState,
};
