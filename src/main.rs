use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod error;
mod llm;
mod tts;

use api::routes::{create_router, AppState};
use config::RelayConfig;
use llm::GeminiClient;
use tts::ElevenLabsClient;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    // Read .env before anything looks at the environment, RUST_LOG included
    let dotenv = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match dotenv {
        Ok(path) => tracing::info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => tracing::debug!("No .env file found"),
        Err(e) => tracing::warn!("Ignoring unreadable .env file: {}", e),
    }

    if let Err(e) = run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = RelayConfig::from_env()?;
    let addr = config.listen_addr()?;

    tracing::info!("Voice relay server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Starting server on http://{}", addr);
    tracing::info!(
        "Gemini model: {}, ElevenLabs voice: {} ({})",
        config.gemini.model,
        config.elevenlabs.voice_id,
        config.elevenlabs.model_id
    );
    tracing::info!("Allowed origins: {}", config.allowed_origins.join(", "));

    let http = reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()?;

    let completion = GeminiClient::new(http.clone(), &config.gemini, config.upstream_timeout);
    let synthesis = ElevenLabsClient::new(http, &config.elevenlabs, config.upstream_timeout);
    tracing::debug!("Completion endpoint: {}", completion.endpoint());
    tracing::debug!("Synthesis endpoint: {}", synthesis.endpoint());

    let state = Arc::new(AppState {
        completion: Arc::new(completion),
        synthesis: Arc::new(synthesis),
        allowed_origins: config.allowed_origins.clone(),
    });

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
