//! HTTP server and client for the classroom registry.

pub mod api;
pub mod client;
pub mod config;
mod error;
mod runtime;

pub use api::{router, AppState, ErrorBody, HealthResponse, MessageResponse};
pub use client::ApiClient;
pub use config::ServerConfig;
pub use error::{ApiError, ServerError};
pub use runtime::{start_blocking, Server};
