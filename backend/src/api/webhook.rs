use axum::Json;
use serde_json::json;

/// Webhook 端点 - 记录收到的负载
pub async fn receive_webhook(Json(payload): Json<serde_json::Value>) -> Json<serde_json::Value> {
    tracing::info!("Received webhook payload: {}", payload);

    Json(json!({ "status": "success" }))
}
