// API Server Binary Entry Point
//
// Purpose: Start the Axum server for the crop recommendation workflow
// Usage: cargo run --features api --bin api_server

use crop_recommender::config::StrategyConfig;
use crop_recommender::{create_router, AppConfig, AppState};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Default log level: info for our crate, warn for others
                    "crop_recommender=info,tower_http=debug,axum=debug,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting API server...");

    let config = AppConfig::from_env()?;

    tracing::info!("Configuration:");
    tracing::info!("  PORT: {}", config.port);
    match &config.strategy {
        StrategyConfig::Local { seed } => {
            tracing::info!("  RECOMMENDER_STRATEGY: local (seed: {:?})", seed);
        }
        StrategyConfig::Remote { endpoint, timeout, fields } => {
            tracing::info!("  RECOMMENDER_STRATEGY: remote");
            tracing::info!("  RECOMMENDER_ENDPOINT: {}", endpoint);
            tracing::info!("  RECOMMENDER_TIMEOUT_SECS: {}", timeout.as_secs());
            tracing::info!("  RECOMMENDER_WIRE_FIELDS: {:?}", fields.overrides());
        }
    }
    tracing::info!("  FORM_VARIANT: {:?}", config.form_variant);
    tracing::info!("  SESSION_TTL_SECS: {}", config.session_ttl.as_secs());
    tracing::info!("  BACKEND: {}", if config.backend.is_some() { "configured" } else { "none" });

    let state = AppState::new(&config)?;

    // Create router with all endpoints and middleware
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
