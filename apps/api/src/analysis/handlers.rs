//! Axum handler for `POST /api/analyze`.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use crate::analysis::{AnalysisError, AnalysisRequest, AnalysisResult};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/analyze
///
/// Body: `{ "resume": string, "jd": string }`. Returns `{ "result": string }`.
pub async fn handle_analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, AppError> {
    let expose_detail = state.debug_mode();

    let Json(request) = payload.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::analysis(AnalysisError::PayloadTooLarge, expose_detail)
        } else {
            AppError::BadRequest(rejection.body_text())
        }
    })?;

    let result = state
        .analyzer
        .analyze(request.resume.as_deref(), request.jd.as_deref())
        .await
        .map_err(|e| AppError::analysis(e, expose_detail))?;

    Ok(Json(result))
}
