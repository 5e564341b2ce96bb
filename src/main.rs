//! Machine Translator - Main entry point
//!
//! Loads configuration, builds the translation chain and serves the HTTP API.

use anyhow::{Context, Result};
use machine_translator::{
    api::{create_router, AppState},
    chain::{OpenAiChatModel, TranslationChain},
    core::{init_metrics, init_tracing, AppConfig},
};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before reading any environment variables)
    dotenvy::dotenv().ok();

    init_tracing();
    init_metrics();

    let config = AppConfig::from_env()?;
    if config.provider.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; translation requests will fail until it is");
    }

    let http_client = create_http_client(&config)?;
    let model = OpenAiChatModel::new(http_client, &config.provider);
    let chain = TranslationChain::new(Arc::new(model));
    let state = Arc::new(AppState::new(chain));

    let app = create_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Starting Machine Translator on http://{}", addr);
    tracing::info!("Chain API: /chain/invoke, /chain/batch, /chain/stream");
    tracing::info!("Schemas: /chain/input_schema, /chain/output_schema, /openapi.json");
    tracing::info!("Metrics endpoint: /metrics");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the shared HTTP client for provider calls.
///
/// No timeout is set unless `REQUEST_TIMEOUT_SECS` is configured.
fn create_http_client(config: &AppConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().danger_accept_invalid_certs(!config.verify_ssl);

    if let Some(secs) = config.request_timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    builder.build().context("Failed to build HTTP client")
}
