/// Health check endpoint
///
/// `GET /health` - liveness probe, no authentication.

use axum::Json;
use serde_json::{json, Value};

/// Returns service status and version
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
