//! Router behavior driven in-process through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use classroom_core::Registry;
use classroom_server::{router, AppState, ServerConfig};

fn app() -> (Router, Arc<Registry>) {
    let registry = Arc::new(Registry::new());
    let app = router(AppState::new(Arc::clone(&registry)), &ServerConfig::ephemeral());
    (app, registry)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

async fn create_class(app: &Router, name: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/classes",
        Some(json!({"class_name": name, "teacher": "Ada"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "body: {body}");
    body["id"].as_str().expect("id").to_string()
}

async fn create_task(app: &Router, class_id: &str, title: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/tasks",
        Some(json!({"class_id": class_id, "title": title})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "body: {body}");
    body["id"].as_str().expect("id").to_string()
}

#[tokio::test]
async fn class_crud_over_http() {
    let (app, _) = app();
    let id = create_class(&app, "Algorithms").await;

    let (status, body) = send(&app, Method::GET, &format!("/classes/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["class_name"], "Algorithms");
    assert_eq!(body["teacher"], "Ada");

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/classes/{id}"),
        Some(json!({"class_name": "Compilers", "teacher": "Grace"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.as_str());
    assert_eq!(body["class_name"], "Compilers");

    let (status, body) = send(&app, Method::GET, "/classes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().expect("array").len(), 1);

    let (status, body) = send(&app, Method::DELETE, &format!("/classes/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Class deleted successfully"}));

    let (status, body) = send(&app, Method::GET, &format!("/classes/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Not Found", "message": "class not found"}));
}

#[tokio::test]
async fn validation_failures_are_bad_requests() {
    let (app, registry) = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/classes",
        Some(json!({"class_name": "  ", "teacher": "Ada"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");
    assert_eq!(body["message"], "class_name and teacher are required");

    let class_id = create_class(&app, "Algorithms").await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/tasks",
        Some(json!({"class_id": class_id, "title": "HW1", "due_at": "next week"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "invalid due_at (use RFC3339)");

    let (status, body) = send(
        &app,
        Method::POST,
        "/tasks",
        Some(json!({"class_id": "no-such-class", "title": "HW1"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "class not found");
    assert!(registry.list_tasks().is_empty());
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let (app, _) = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/classes")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let body: Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(body["message"], "invalid JSON body");
}

#[tokio::test]
async fn task_lifecycle_over_http() {
    let (app, _) = app();
    let class_id = create_class(&app, "Algorithms").await;
    let task_id = create_task(&app, &class_id, "HW1").await;

    let (status, body) = send(&app, Method::GET, &format!("/tasks/{task_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_closed"], false);
    assert!(body.get("closed_at").is_none());

    let (status, closed) =
        send(&app, Method::PATCH, &format!("/tasks/{task_id}/close"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(closed["is_closed"], true);
    assert!(closed["closed_at"].is_string());

    let (_, again) = send(&app, Method::PATCH, &format!("/tasks/{task_id}/close"), None).await;
    assert_eq!(again["closed_at"], closed["closed_at"]);

    let (status, opened) = send(&app, Method::PATCH, &format!("/tasks/{task_id}/open"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(opened["is_closed"], false);
    assert!(opened.get("closed_at").is_none());

    let (status, body) = send(&app, Method::DELETE, &format!("/tasks/{task_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Task deleted successfully");

    let (status, _) = send(&app, Method::PATCH, &format!("/tasks/{task_id}/close"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_task_moves_and_revalidates() {
    let (app, _) = app();
    let first = create_class(&app, "Algorithms").await;
    let second = create_class(&app, "Compilers").await;
    let task_id = create_task(&app, &first, "HW1").await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/tasks/{task_id}"),
        Some(json!({
            "class_id": second,
            "title": "Lexer",
            "description": "tokens",
            "due_at": "2025-02-01T12:00:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["class_id"], second.as_str());
    assert_eq!(body["due_at"], "2025-02-01T12:00:00Z");

    let (status, body) = send(&app, Method::GET, &format!("/classes/{first}/tasks"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/tasks/{task_id}"),
        Some(json!({"class_id": "gone", "title": "Lexer"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "class not found");
}

#[tokio::test]
async fn deleting_class_cascades_over_http() {
    let (app, registry) = app();
    let doomed = create_class(&app, "Algorithms").await;
    let kept = create_class(&app, "Compilers").await;
    let gone = create_task(&app, &doomed, "HW1").await;
    let survivor = create_task(&app, &kept, "Lexer").await;

    let (status, _) = send(&app, Method::DELETE, &format!("/classes/{doomed}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::GET, &format!("/tasks/{gone}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::GET, &format!("/classes/{doomed}/tasks"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let tasks = registry.list_tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id.as_str(), survivor);
}

#[tokio::test]
async fn health_reports_counts() {
    let (app, _) = app();
    let class_id = create_class(&app, "Algorithms").await;
    let task_id = create_task(&app, &class_id, "HW1").await;
    create_task(&app, &class_id, "HW2").await;
    send(&app, Method::PATCH, &format!("/tasks/{task_id}/close"), None).await;

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["classes"], 1);
    assert_eq!(body["tasks"], 2);
    assert_eq!(body["open_tasks"], 1);
    assert_eq!(body["closed_tasks"], 1);
}

#[tokio::test]
async fn unknown_routes_get_json_404() {
    let (app, _) = app();
    let (status, body) = send(&app, Method::GET, "/students", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Not Found", "message": "not found"}));
}

#[tokio::test]
async fn unsupported_methods_get_json_405_with_allow() {
    let (app, _) = app();
    let cases = [
        (Method::POST, "/tasks/abc/close", "PATCH"),
        (Method::DELETE, "/classes", "POST"),
        (Method::PATCH, "/classes/x", "PUT"),
    ];
    for (method, uri, allowed) in cases {
        let request = Request::builder()
            .method(method.clone())
            .uri(uri)
            .body(Body::empty())
            .expect("request");
        let response = app.clone().oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");

        let allow = response
            .headers()
            .get(header::ALLOW)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(allow.contains(allowed), "{method} {uri}: allow = {allow:?}");

        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let body: Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(
            body,
            json!({"error": "Method Not Allowed", "message": "method not allowed"}),
            "{method} {uri}"
        );
    }
}

#[tokio::test]
async fn cors_preflight_allows_any_origin() {
    let (app, _) = app();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/tasks")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert!(response.status().is_success());
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}
