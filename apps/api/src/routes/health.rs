use axum::Json;
use serde_json::{json, Value};

/// GET /health
/// Liveness check; also used by the companion's `status` command.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "radar-api"
    }))
}
