use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use todo_api_rust::config::{self, DEVELOPMENT_JWT_SECRET};
use todo_api_rust::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::config().clone();
    config.validate().context("invalid configuration")?;
    info!("Starting To-Do API in {:?} mode", config.environment);
    if config.security.jwt_secret == DEVELOPMENT_JWT_SECRET {
        warn!("Using the built-in development JWT secret; set JWT_SECRET outside local development");
    }

    let bind_addr = config.bind_addr();
    let state = AppState::initialize(config)
        .await
        .context("failed to initialize database")?;
    let database = state.database.clone();

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("To-Do API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    database.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
