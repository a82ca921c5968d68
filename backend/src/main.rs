//! AgroGenius - Backend Server
//!
//! Serves the AI orchestration API consumed by the farmer-facing web UI.

use std::{net::SocketAddr, sync::Arc, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agrogenius_backend::{create_app, external::GeminiClient, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "agrogenius_server=debug,agrogenius_backend=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting AgroGenius Server");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!(
        "Models: text={}, image={}",
        config.gemini.text_model,
        config.gemini.image_model
    );

    let model = GeminiClient::new(&config.gemini)?;
    let state = AppState::new(config.clone(), Arc::new(model));
    let _sweeper = state
        .chat_sessions
        .spawn_sweeper(Duration::from_secs(config.chat.sweep_interval_secs));

    // Build application
    let app = create_app(state);

    // Start server
    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
