use axum::Json;
use serde_json::{json, Value};

pub const SERVICE_NAME: &str = "AI Resume JD Analyzer";

/// GET /
pub async fn root_handler() -> Json<Value> {
    Json(json!({ "message": SERVICE_NAME }))
}

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": env!("CARGO_PKG_NAME")
    }))
}
