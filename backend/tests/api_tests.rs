use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use field_mapper::{
    api::{cors_layer, create_router},
    build_state,
    config::{AppConfig, StorageBackend, DEFAULT_DATABASE_URL, DEFAULT_FETCH_URL},
    db::Storage,
    services::{IntervalJobRegistry, JobAction},
    utils::error::Result,
};
use serde_json::{json, Value};
use tower::ServiceExt;

struct NoopAction;

#[async_trait]
impl JobAction for NoopAction {
    async fn run(&self) -> Result<usize> {
        Ok(0)
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        port: 0,
        storage: StorageBackend::Memory,
        database_url: DEFAULT_DATABASE_URL.to_string(),
        db_max_connections: 1,
        allowed_origins: "http://localhost:3000".to_string(),
        fetch_url: DEFAULT_FETCH_URL.to_string(),
        fetch_interval_secs: 60,
        fetch_timeout_secs: 10,
    }
}

fn app() -> Router {
    let config = test_config();
    let state = build_state(
        Storage::memory(),
        Arc::new(IntervalJobRegistry::new()),
        Arc::new(NoopAction),
        &config,
    );
    create_router(state, cors_layer(&config.origins()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

#[tokio::test]
async fn health_reports_healthy() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn mapping_upsert_flow() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/field-mappings",
        Some(json!({"api_field": "user_id", "db_field": "uid"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": 1, "api_field": "user_id", "db_field": "uid"}));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/field-mappings",
        Some(json!({"api_field": "user_id", "db_field": "user_identifier"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);
    assert_eq!(body["db_field"], "user_identifier");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/field-mappings",
        Some(json!({"api_field": "email", "db_field": "user_identifier"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "mapping_conflict");
    assert!(body["error"].as_str().unwrap().starts_with("creation conflict"));

    let (status, body) = send(&app, Method::GET, "/api/field-mappings/user_id", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["db_field"], "user_identifier");
}

#[tokio::test]
async fn unknown_mapping_is_404() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/api/field-mappings/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn mapping_list_is_paginated() {
    let app = app();
    for i in 0..3 {
        send(
            &app,
            Method::POST,
            "/api/field-mappings",
            Some(json!({"api_field": format!("api_{}", i), "db_field": format!("db_{}", i)})),
        )
        .await;
    }

    let (status, body) = send(&app, Method::GET, "/api/field-mappings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (status, body) = send(&app, Method::GET, "/api/field-mappings?skip=1&limit=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{"id": 2, "api_field": "api_1", "db_field": "db_1"}]));

    let (status, body) = send(&app, Method::GET, "/api/field-mappings?limit=-5", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_input");
}

#[tokio::test]
async fn scheduler_toggle_flow() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/scheduler",
        Some(json!({"task_name": "sync", "enabled": false})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": 1, "task_name": "sync", "enabled": false}));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/scheduler",
        Some(json!({"task_name": "sync", "enabled": true})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "duplicate_task");

    for _ in 0..2 {
        let (status, body) = send(&app, Method::PUT, "/api/scheduler/sync?enabled=true", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["enabled"], true);
    }

    let (_, jobs) = send(&app, Method::GET, "/api/jobs", None).await;
    let jobs = jobs.as_array().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["task_name"], "sync");
    assert_eq!(jobs[0]["period_secs"], 60);

    let (status, body) = send(&app, Method::PUT, "/api/scheduler/sync?enabled=false", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["enabled"], false);

    let (_, jobs) = send(&app, Method::GET, "/api/jobs", None).await;
    assert!(jobs.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn scheduler_path_names_are_trimmed() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/scheduler",
        Some(json!({"task_name": " sync "})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task_name"], "sync");

    let (status, body) = send(&app, Method::GET, "/api/scheduler/%20sync%20", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task_name"], "sync");

    let (status, body) =
        send(&app, Method::PUT, "/api/scheduler/%20sync%20?enabled=true", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["enabled"], true);
}

#[tokio::test]
async fn disabling_unregistered_task_reports_registry_error() {
    let app = app();
    send(
        &app,
        Method::POST,
        "/api/scheduler",
        Some(json!({"task_name": "sync"})),
    )
    .await;

    let (status, body) = send(&app, Method::PUT, "/api/scheduler/sync?enabled=false", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "registry_consistency");

    let (status, body) = send(&app, Method::GET, "/api/scheduler/sync", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["enabled"], false);
}

#[tokio::test]
async fn updating_unknown_scheduler_is_404() {
    let app = app();

    let (status, body) = send(&app, Method::PUT, "/api/scheduler/missing?enabled=true", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");

    let (status, _) = send(&app, Method::GET, "/api/scheduler/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn webhook_acknowledges_payload() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/webhook",
        Some(json!({"event": "test"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "success"}));
}

#[tokio::test]
async fn cors_allows_configured_origin() {
    let app = app();

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/field-mappings")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:3000"
    );

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/field-mappings")
        .header(header::ORIGIN, "http://evil.test")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}
