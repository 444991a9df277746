use classroom_core::{ErrorKind, RegistryError};
use thiserror::Error;

/// Error surface for the server runtime and the HTTP client.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error at {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server is not reachable at {url}: {message}")]
    Unreachable { url: String, message: String },

    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("server protocol error: {0}")]
    Protocol(String),
}

impl ServerError {
    /// The registry error kind behind an API failure, when the status maps to one.
    pub fn registry_kind(&self) -> Option<ErrorKind> {
        match self {
            ServerError::Api { status: 400, .. } => Some(ErrorKind::InvalidArgument),
            ServerError::Api { status: 404, .. } => Some(ErrorKind::NotFound),
            ServerError::Api { status: 500, .. } => Some(ErrorKind::Internal),
            _ => None,
        }
    }
}

pub(crate) fn io_err(context: impl Into<String>, source: std::io::Error) -> ServerError {
    ServerError::Io {
        context: context.into(),
        source,
    }
}

/// Errors a handler can answer with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("invalid JSON body")]
    InvalidJson,

    #[error("not found")]
    NoRoute,

    #[error("method not allowed")]
    MethodNotAllowed,
}
