//! HTTP/JSON surface over the registry.
//!
//! Handlers call the registry synchronously: registry operations never wait
//! on anything but its own locks, so a request timeout firing afterwards
//! cannot interrupt a mutation halfway.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use classroom_core::{
    Class, ClassId, ClassInput, ErrorKind, Registry, RegistryStats, Task, TaskId, TaskInput,
};

use crate::config::ServerConfig;
use crate::error::ApiError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub version: &'static str,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            version: env!("CARGO_PKG_VERSION"),
            started_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire bodies
// ---------------------------------------------------------------------------

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// HTTP reason phrase, e.g. "Bad Request".
    pub error: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: i64,
    pub classes: usize,
    pub tasks: usize,
    pub open_tasks: usize,
    pub closed_tasks: usize,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Registry(err) => match err.kind() {
                ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::InvalidJson => StatusCode::BAD_REQUEST,
            ApiError::NoRoute => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = ErrorBody {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let routes = Router::new()
        .route("/health", get(health))
        .route("/classes", get(list_classes).post(create_class))
        .route(
            "/classes/:id",
            get(get_class).put(update_class).delete(delete_class),
        )
        .route("/classes/:id/tasks", get(list_class_tasks))
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/tasks/:id/close", patch(close_task))
        .route("/tasks/:id/open", patch(open_task))
        .fallback(no_route)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http());

    let routes = if config.enable_cors {
        routes.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers([header::CONTENT_TYPE])
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ]),
        )
    } else {
        routes
    };

    routes.with_state(state)
}

async fn no_route() -> ApiError {
    ApiError::NoRoute
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let RegistryStats {
        classes,
        tasks,
        open_tasks,
        closed_tasks,
    } = state.registry.stats();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: state.version.to_string(),
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
        classes,
        tasks,
        open_tasks,
        closed_tasks,
    })
}

// ---------------------------------------------------------------------------
// Classes
// ---------------------------------------------------------------------------

async fn list_classes(State(state): State<AppState>) -> Json<Vec<Class>> {
    Json(state.registry.list_classes())
}

async fn create_class(
    State(state): State<AppState>,
    payload: Result<Json<ClassInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Class>)> {
    let Json(input) = payload.map_err(|_| ApiError::InvalidJson)?;
    let class = state.registry.create_class(input)?;
    Ok((StatusCode::CREATED, Json(class)))
}

async fn get_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Class>> {
    Ok(Json(state.registry.get_class(&ClassId::from(id))?))
}

async fn update_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ClassInput>, JsonRejection>,
) -> ApiResult<Json<Class>> {
    let Json(input) = payload.map_err(|_| ApiError::InvalidJson)?;
    Ok(Json(state.registry.update_class(&ClassId::from(id), input)?))
}

async fn delete_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.registry.delete_class(&ClassId::from(id))?;
    Ok(Json(MessageResponse {
        message: "Class deleted successfully".to_string(),
    }))
}

async fn list_class_tasks(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(state.registry.list_tasks_by_class(&ClassId::from(id))?))
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

async fn list_tasks(State(state): State<AppState>) -> Json<Vec<Task>> {
    Json(state.registry.list_tasks())
}

async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<TaskInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let Json(input) = payload.map_err(|_| ApiError::InvalidJson)?;
    let task = state.registry.create_task(input)?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    Ok(Json(state.registry.get_task(&TaskId::from(id))?))
}

async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TaskInput>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Json(input) = payload.map_err(|_| ApiError::InvalidJson)?;
    Ok(Json(state.registry.update_task(&TaskId::from(id), input)?))
}

async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.registry.delete_task(&TaskId::from(id))?;
    Ok(Json(MessageResponse {
        message: "Task deleted successfully".to_string(),
    }))
}

async fn close_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    Ok(Json(state.registry.close_task(&TaskId::from(id))?))
}

async fn open_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    Ok(Json(state.registry.open_task(&TaskId::from(id))?))
}
