mod analysis;
mod config;
mod errors;
mod extract;
mod llm_client;
mod routes;
mod state;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use std::net::SocketAddr;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::AnalysisRequester;
use crate::config::Config;
use crate::extract::TextExtractor;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JD Analyzer API v{}", env!("CARGO_PKG_VERSION"));

    if config.analyzer.api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; analysis requests will fail until it is configured");
    }
    if config.analyzer.debug_mode {
        warn!("Debug mode enabled: upstream error detail is returned to callers");
    }

    let analyzer = AnalysisRequester::from_config(config.analyzer.clone())
        .context("Failed to build HTTP client")?;
    info!(
        "LLM client initialized (model: {}, timeout: {:?})",
        llm_client::MODEL,
        config.analyzer.timeout
    );

    let state = AppState {
        config: config.clone(),
        extractor: TextExtractor::default(),
        analyzer,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors(&config.allowed_origins));

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Credentialed CORS for the configured origins. Invalid origin strings are
/// skipped with a warning.
fn build_cors(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{origin}'");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
