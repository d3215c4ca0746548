//! LLM Client — the single point of entry for all Gemini API calls.
//!
//! No other module may call the generative-language API directly.
//! One POST per call: no retry, no fallback endpoint.
//!
//! Model: gemini-1.5-flash (hardcoded in the endpoint to prevent drift)

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

pub const MODEL: &str = "gemini-1.5-flash";
pub const GEMINI_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";
const API_KEY_HEADER: &str = "x-goog-api-key";
/// Upper bound on upstream text kept in a reason summary.
const MAX_REASON_CHARS: usize = 500;

/// Connection, timeout, or body-read failure below the HTTP status layer.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        TransportError(e.to_string())
    }
}

/// Classified failure of a call to the remote model.
#[derive(Debug, Error)]
pub enum RemoteApiError {
    #[error("Gemini API returned {status}: {reason}")]
    HttpError { status: u16, reason: String },

    #[error("Gemini API quota exceeded ({status}): {reason}")]
    QuotaExceeded { status: u16, reason: String },

    #[error("Gemini API request failed: {0}")]
    TransportOrParseError(String),
}

/// Status code and body text of an upstream response, whatever the status.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Narrow HTTP capability so tests can run without a network.
#[async_trait]
pub trait HttpPoster: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<RawResponse, TransportError>;
}

/// Production `HttpPoster` backed by a shared `reqwest::Client` with a fixed timeout.
#[derive(Clone)]
pub struct ReqwestPoster {
    client: Client,
}

impl ReqwestPoster {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
        })
    }
}

#[async_trait]
impl HttpPoster for ReqwestPoster {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<RawResponse, TransportError> {
        let mut request = self.client.post(url).json(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }
}

#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

impl GeminiResponse {
    /// Text of the first candidate's first content part.
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
    status: Option<String>,
}

/// Thin client over the `generateContent` endpoint.
#[derive(Clone)]
pub struct LlmClient {
    poster: Arc<dyn HttpPoster>,
    endpoint: String,
}

impl LlmClient {
    pub fn new(poster: Arc<dyn HttpPoster>, endpoint: impl Into<String>) -> Self {
        Self {
            poster,
            endpoint: endpoint.into(),
        }
    }

    /// Sends a single-turn prompt and returns the model's text.
    pub async fn generate(&self, api_key: &str, prompt: &str) -> Result<String, RemoteApiError> {
        let request_body = serde_json::to_value(GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
        })
        .map_err(|e| RemoteApiError::TransportOrParseError(e.to_string()))?;

        let response = self
            .poster
            .post_json(
                &self.endpoint,
                &[(API_KEY_HEADER, api_key)],
                &request_body,
            )
            .await
            .map_err(|e| {
                error!("Gemini API transport failure: {e}");
                RemoteApiError::TransportOrParseError(e.0)
            })?;

        if !response.is_success() {
            let err = classify_error_response(&response);
            match &err {
                RemoteApiError::QuotaExceeded { .. } => {
                    warn!("Gemini API quota exhausted: {}", response.body)
                }
                _ => error!("Gemini API returned {}: {}", response.status, response.body),
            }
            return Err(err);
        }

        let parsed: GeminiResponse = serde_json::from_str(&response.body).map_err(|e| {
            error!("Gemini API response was not valid JSON: {e}; body: {}", response.body);
            RemoteApiError::TransportOrParseError(format!("invalid response body: {e}"))
        })?;

        let text = parsed.text().ok_or_else(|| {
            error!("Gemini API response missing candidate text: {}", response.body);
            RemoteApiError::TransportOrParseError(
                "response missing candidates[0].content.parts[0].text".to_string(),
            )
        })?;

        debug!(
            "Gemini call succeeded: model={MODEL}, response_chars={}",
            text.chars().count()
        );

        Ok(text.to_string())
    }
}

/// Maps a non-2xx response to `HttpError`, or `QuotaExceeded` when the body
/// carries a resource-exhausted marker.
fn classify_error_response(response: &RawResponse) -> RemoteApiError {
    let envelope = serde_json::from_str::<GeminiError>(&response.body).ok();

    let reason = envelope
        .as_ref()
        .map(|e| e.error.message.clone())
        .unwrap_or_else(|| truncate_chars(response.body.trim(), MAX_REASON_CHARS));

    let quota = envelope
        .as_ref()
        .and_then(|e| e.error.status.as_deref())
        .is_some_and(|s| s == "RESOURCE_EXHAUSTED")
        || is_quota_body(&response.body);

    if quota {
        RemoteApiError::QuotaExceeded {
            status: response.status,
            reason,
        }
    } else {
        RemoteApiError::HttpError {
            status: response.status,
            reason,
        }
    }
}

fn is_quota_body(body: &str) -> bool {
    if body.contains("RESOURCE_EXHAUSTED") {
        return true;
    }
    let lower = body.to_lowercase();
    lower.contains("quota exceeded") || lower.contains("exceeded your current quota")
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
