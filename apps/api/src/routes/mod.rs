pub mod health;

use std::any::Any;

use axum::{
    extract::DefaultBodyLimit,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;

use crate::analysis::handlers::handle_analyze;
use crate::errors::AppError;
use crate::extract::handlers::handle_extract_text;
use crate::state::AppState;

async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

/// Turns a handler panic into the generic `{"error": ...}` 500 body.
fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| payload.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic".to_string());
    AppError::Internal(anyhow::anyhow!("handler panicked: {detail}")).into_response()
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes;

    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        // Analyze API
        .route("/api/analyze", post(handle_analyze))
        .route("/api/analyze/", post(handle_analyze))
        .route("/api/analyze/extract-text", post(handle_extract_text))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}
