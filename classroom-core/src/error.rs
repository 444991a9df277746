//! Error types for classroom-core.

use std::fmt;

use thiserror::Error;

/// Which collection an id was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Class,
    Task,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Class => write!(f, "class"),
            Entity::Task => write!(f, "task"),
        }
    }
}

/// Coarse classification used by transports to pick a protocol status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    Internal,
}

/// All errors that can arise from registry operations.
///
/// Every variant is returned before any state is altered.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A required field is blank, a timestamp is malformed, or a task names a
    /// class that does not exist.
    #[error("{0}")]
    InvalidArgument(String),

    /// The targeted class or task id is not present.
    #[error("{entity} not found")]
    NotFound { entity: Entity, id: String },

    /// Identifier allocation failed.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            RegistryError::NotFound { .. } => ErrorKind::NotFound,
            RegistryError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        RegistryError::InvalidArgument(message.into())
    }

    pub(crate) fn class_not_found(id: impl fmt::Display) -> Self {
        RegistryError::NotFound {
            entity: Entity::Class,
            id: id.to_string(),
        }
    }

    pub(crate) fn task_not_found(id: impl fmt::Display) -> Self {
        RegistryError::NotFound {
            entity: Entity::Task,
            id: id.to_string(),
        }
    }
}

/// The entropy source could not produce an identifier.
#[derive(Debug, Error)]
#[error("failed to generate id: {0}")]
pub struct IdError(pub String);

impl From<IdError> for RegistryError {
    fn from(err: IdError) -> Self {
        RegistryError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_entity() {
        assert_eq!(RegistryError::class_not_found("c1").to_string(), "class not found");
        assert_eq!(RegistryError::task_not_found("t1").to_string(), "task not found");
    }

    #[test]
    fn id_error_maps_to_internal() {
        let err: RegistryError = IdError("entropy unavailable".into()).into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(err.to_string().contains("entropy unavailable"));
    }
}
