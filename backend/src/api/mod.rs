pub mod error;
pub mod mapping;
pub mod scheduler;
pub mod webhook;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::services::{MappingService, SchedulerService};

/// 路由共享状态
#[derive(Clone)]
pub struct AppState {
    pub mappings: MappingService,
    pub schedulers: SchedulerService,
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "field-mapper"
    }))
}

/// 根据允许的来源构建 CORS 配置，包含 `*` 时不做限制
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true)
}

/// 创建 API 路由
pub fn create_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        // Health check
        .route("/api/health", get(health_check))

        // 字段映射路由
        .route(
            "/api/field-mappings",
            post(mapping::upsert_mapping).get(mapping::list_mappings),
        )
        .route("/api/field-mappings/:api_field", get(mapping::get_mapping))

        // 定时任务路由
        .route("/api/scheduler", post(scheduler::create_scheduler))
        .route(
            "/api/scheduler/:task_name",
            get(scheduler::get_scheduler).put(scheduler::update_scheduler),
        )
        .route("/api/jobs", get(scheduler::list_jobs))

        // Webhook
        .route("/api/webhook", post(webhook::receive_webhook))

        // CORS 配置
        .layer(cors)

        // 共享状态
        .with_state(state)
}
