//! FraudWatch Scoring Server - Main Entry Point

use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fraudwatch_scoring_server::{AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Initialize logging: JSON lines in production, human-readable otherwise
    let (json, plain) = if config.is_production() {
        (Some(tracing_subscriber::fmt::layer().json()), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer()))
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "fraudwatch_scoring_server=debug,tower_http=debug".into()))
        .with(json)
        .with(plain)
        .init();

    tracing::info!("FraudWatch Scoring Server starting...");
    tracing::info!(
        "Threshold: {} | stream poll: {}ms | metrics window: {}h | env: {}",
        config.fraud_threshold,
        config.stream_poll_ms,
        config.metrics_window_hours,
        config.environment
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::new(config)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🚀 Server listening on http://{}", addr);

    fraudwatch_scoring_server::serve(listener, state).await?;
    Ok(())
}
