use crate::analysis::AnalysisRequester;
use crate::config::Config;
use crate::extract::TextExtractor;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything here is immutable; clones share parsers and the HTTP client.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub extractor: TextExtractor,
    pub analyzer: AnalysisRequester,
}

impl AppState {
    /// Whether server-class errors may carry upstream or parser detail.
    pub fn debug_mode(&self) -> bool {
        self.config.analyzer.debug_mode
    }
}
