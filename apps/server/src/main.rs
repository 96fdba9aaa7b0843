//! Server binary: wires configuration, the database, and the router, then
//! serves until a shutdown signal arrives.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use caixa_db::{Database, DbConfig};
use caixa_server::auth::AuthVerifier;
use caixa_server::config::ServerConfig;
use caixa_server::routes::build_router;
use caixa_server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,caixa_server=debug")),
        )
        .with_target(true)
        .init();

    info!("starting caixa server");

    let config = ServerConfig::load().context("failed to load configuration")?;
    info!(
        port = config.http_port,
        database = %config.database_path,
        "configuration loaded"
    );

    let db = Database::new(DbConfig::new(&config.database_path))
        .await
        .context("failed to initialize database")?;
    info!("database ready, migrations applied");

    let auth = AuthVerifier::new(config.jwt_secret.clone(), config.jwt_lifetime_secs);
    let state = AppState::new(db.clone(), auth);
    let app = build_router(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received, starting graceful shutdown");
}
