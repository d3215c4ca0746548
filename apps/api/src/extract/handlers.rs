//! Axum handler for `POST /api/analyze/extract-text`.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::errors::AppError;
use crate::extract::{ExtractError, ExtractedText, UploadedDocument};
use crate::state::AppState;

/// Multipart part carrying the upload.
const FILE_FIELD: &str = "file";

/// POST /api/analyze/extract-text
///
/// Accepts a multipart upload with a `file` part and returns the recovered text.
/// Parsing runs on the blocking pool.
pub async fn handle_extract_text(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractedText>, AppError> {
    let expose_detail = state.debug_mode();
    let mut multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let document = read_file_part(&mut multipart)
        .await
        .map_err(|e| multipart_error(e, expose_detail))?;

    let extractor = state.extractor.clone();
    let extracted = tokio::task::spawn_blocking(move || extractor.extract(document.as_ref()))
        .await
        .map_err(|e| {
            AppError::Internal(anyhow::anyhow!("spawn_blocking failed in text extraction: {e}"))
        })?
        .map_err(|e| AppError::extract(e, expose_detail))?;

    info!(
        "Extracted {} chars from '{}' ({} bytes)",
        extracted.text.chars().count(),
        extracted.source_filename,
        extracted.source_byte_size
    );

    Ok(Json(extracted))
}

/// Returns the first `file` part, skipping any other form fields.
async fn read_file_part(
    multipart: &mut Multipart,
) -> Result<Option<UploadedDocument>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let declared_mime_type = field.content_type().unwrap_or_default().to_string();
        let filename = field.file_name().unwrap_or_default().to_string();
        let raw_bytes = field.bytes().await?;

        return Ok(Some(UploadedDocument {
            raw_bytes,
            declared_mime_type,
            filename,
        }));
    }
    Ok(None)
}

/// A body cut off by the transport limit is an oversized upload; anything
/// else is a malformed request.
fn multipart_error(e: MultipartError, expose_detail: bool) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::extract(ExtractError::FileTooLarge, expose_detail)
    } else {
        AppError::BadRequest(e.body_text())
    }
}
