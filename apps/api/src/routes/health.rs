use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

use crate::embedding::MODEL;

/// GET /api/health
/// Returns a simple status object with the embedding backend and server time.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running",
        "model": MODEL,
        "timestamp": Utc::now().to_rfc3339()
    }))
}
