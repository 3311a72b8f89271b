mod config;
mod critique;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, LlmProvider, LlmSettings};
use crate::critique::service::CritiqueService;
use crate::extraction::ocr::build_recognizer;
use crate::llm_client::{AnthropicClient, LlmBackend, OllamaClient};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing or malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Critic v{}", env!("CARGO_PKG_VERSION"));

    let llm = build_llm_backend(&config.llm)?;
    info!(
        "LLM backend initialized (provider: {:?}, model: {}, images: {})",
        config.llm.provider,
        llm.model(),
        llm.supports_images()
    );
    info!(
        "Scoring policy: floor {}, mismatch ceiling {}",
        config.critique.policy.floor, config.critique.policy.mismatch_ceiling
    );

    let ocr = build_recognizer(config.ocr.enabled, &config.ocr.language)?;
    info!(
        "Image uploads: {}",
        if ocr.is_some() { "OCR to text" } else { "sent to the model as images" }
    );

    let critic = Arc::new(CritiqueService::new(llm, config.critique.clone()));

    let state = AppState {
        critic,
        ocr,
        config: config.clone(),
    };

    // Permissive CORS: the front-end is opened straight from the filesystem.
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the configured model backend.
fn build_llm_backend(settings: &LlmSettings) -> Result<Arc<dyn LlmBackend>> {
    let backend: Arc<dyn LlmBackend> = match settings.provider {
        LlmProvider::Ollama => Arc::new(OllamaClient::new(
            settings.ollama_url.clone(),
            settings.model.clone(),
            settings.ollama_vision,
            settings.timeout,
        )?),
        LlmProvider::Anthropic => {
            let api_key = settings
                .anthropic_api_key
                .clone()
                .ok_or_else(|| anyhow::anyhow!("ANTHROPIC_API_KEY is required for anthropic"))?;
            Arc::new(AnthropicClient::new(
                api_key,
                settings.model.clone(),
                settings.timeout,
            )?)
        }
    };
    Ok(backend)
}
