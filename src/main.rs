use anyhow::Context;
use tracing_subscriber::EnvFilter;

use tower_admin_api::app::{app, AppState};
use tower_admin_api::{config, database};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::config().clone();
    tracing::info!("Starting Tower Admin API in {:?} mode", config.environment);
    if config.security.admin_password_sha256.is_none() {
        tracing::warn!("No ADMIN_PASSWORD or ADMIN_PASSWORD_SHA256 set; login is disabled");
    }

    let store = database::connect(&config).await.context("failed to open tower store")?;
    let port = config.server.port;
    let router = app(AppState::new(store, config));

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Tower Admin API listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
