use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::AnalysisError;
use crate::extract::ExtractError;

pub const GENERIC_INTERNAL_MESSAGE: &str = "Internal server error";
pub const GENERIC_GEMINI_MESSAGE: &str = "Gemini API error";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every variant renders as `{"error": <message>}`. Client-class failures carry
/// their specific message; server-class failures are logged in full and show a
/// generic message unless `expose_detail` (debug mode) is set.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{source}")]
    Extract {
        source: ExtractError,
        expose_detail: bool,
    },

    #[error("{source}")]
    Analysis {
        source: AnalysisError,
        expose_detail: bool,
    },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn extract(source: ExtractError, expose_detail: bool) -> Self {
        AppError::Extract {
            source,
            expose_detail,
        }
    }

    pub fn analysis(source: AnalysisError, expose_detail: bool) -> Self {
        AppError::Analysis {
            source,
            expose_detail,
        }
    }

    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Extract {
                source,
                expose_detail,
            } => match source {
                ExtractError::MissingFile
                | ExtractError::FileTooLarge
                | ExtractError::UnsupportedFileType
                | ExtractError::NoExtractableText => (StatusCode::BAD_REQUEST, source.to_string()),
                ExtractError::PdfExtractionFailed(detail) => {
                    tracing::error!("PDF extraction error: {detail}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        server_message("Error extracting text from PDF", source, *expose_detail),
                    )
                }
                ExtractError::DocxExtractionFailed(detail) => {
                    tracing::error!("DOCX extraction error: {detail}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        server_message("Error extracting text from DOCX", source, *expose_detail),
                    )
                }
            },
            AppError::Analysis {
                source,
                expose_detail,
            } => match source {
                AnalysisError::MissingFields | AnalysisError::PayloadTooLarge => {
                    (StatusCode::BAD_REQUEST, source.to_string())
                }
                AnalysisError::ApiKeyNotConfigured => {
                    tracing::error!("Analysis requested but GEMINI_API_KEY is not set");
                    (StatusCode::INTERNAL_SERVER_ERROR, source.to_string())
                }
                AnalysisError::RemoteApi(e) => {
                    tracing::error!("Gemini API error: {e}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        server_message(GENERIC_GEMINI_MESSAGE, e, *expose_detail),
                    )
                }
            },
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    GENERIC_INTERNAL_MESSAGE.to_string(),
                )
            }
        }
    }
}

fn server_message(generic: &str, detail: &dyn std::fmt::Display, expose_detail: bool) -> String {
    if expose_detail {
        detail.to_string()
    } else {
        generic.to_string()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(json!({ "error": message }))).into_response()
    }
}
