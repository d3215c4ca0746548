//! Resume / job description comparison via the Gemini API.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use crate::config::AnalyzerConfig;
use crate::llm_client::{HttpPoster, LlmClient, RemoteApiError, ReqwestPoster};

pub mod handlers;
pub mod prompts;

use prompts::build_analyze_prompt;

/// Largest accepted combined resume + job description size: 10 MiB of UTF-8.
pub const MAX_PAYLOAD_SIZE: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("resume and jd fields are required")]
    MissingFields,

    #[error("Payload too large. Maximum size is 10MB.")]
    PayloadTooLarge,

    #[error("Gemini API key not configured")]
    ApiKeyNotConfigured,

    #[error(transparent)]
    RemoteApi(#[from] RemoteApiError),
}

/// JSON body of `POST /api/analyze`. Both fields are optional on the wire so
/// that absence surfaces as `MissingFields` rather than a decode error.
#[derive(Debug, Default, Deserialize)]
pub struct AnalysisRequest {
    pub resume: Option<String>,
    pub jd: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    #[serde(rename = "result")]
    pub result_text: String,
}

/// Builds the comparison prompt and sends it upstream. Holds no per-request state.
#[derive(Clone)]
pub struct AnalysisRequester {
    llm: LlmClient,
    config: AnalyzerConfig,
}

impl AnalysisRequester {
    pub fn new(config: AnalyzerConfig, poster: Arc<dyn HttpPoster>) -> Self {
        Self {
            llm: LlmClient::new(poster, config.endpoint.clone()),
            config,
        }
    }

    /// Production requester over a `reqwest` client honouring `config.timeout`.
    pub fn from_config(config: AnalyzerConfig) -> Result<Self, reqwest::Error> {
        let poster = Arc::new(ReqwestPoster::new(config.timeout)?);
        Ok(Self::new(config, poster))
    }

    /// Compares `resume_text` against `jd_text`.
    ///
    /// All validation happens before any network I/O: missing fields, then
    /// combined size, then the API key.
    pub async fn analyze(
        &self,
        resume_text: Option<&str>,
        jd_text: Option<&str>,
    ) -> Result<AnalysisResult, AnalysisError> {
        let (Some(resume_text), Some(jd_text)) = (resume_text, jd_text) else {
            return Err(AnalysisError::MissingFields);
        };

        if resume_text.len() + jd_text.len() > MAX_PAYLOAD_SIZE {
            return Err(AnalysisError::PayloadTooLarge);
        }

        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(AnalysisError::ApiKeyNotConfigured)?;

        let prompt = build_analyze_prompt(resume_text, jd_text);
        info!(
            "Requesting analysis: resume_bytes={}, jd_bytes={}",
            resume_text.len(),
            jd_text.len()
        );

        let result_text = self.llm.generate(api_key, &prompt).await.map_err(|e| {
            error!("Analysis failed: {e:?}");
            AnalysisError::RemoteApi(e)
        })?;

        Ok(AnalysisResult { result_text })
    }
}
