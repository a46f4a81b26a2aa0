use axum::Json;
use serde_json::{json, Value};

/// Liveness probe, handles GET requests to `/health`
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
