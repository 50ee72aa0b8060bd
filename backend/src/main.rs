use anyhow::Context;
use axum::http::HeaderValue;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pawn_ledger::config::LedgerConfig;
use pawn_ledger::{create_router, initialize_backend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = LedgerConfig::default_path();
    let config = match LedgerConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            warn!("Ignoring unusable config, running with defaults: {:#}", e);
            LedgerConfig::default()
        }
    };

    let app_state = initialize_backend(&config)
        .await
        .context("Failed to open any record store")?;

    let allowed_origin: HeaderValue = config
        .allowed_origin
        .parse()
        .with_context(|| format!("Invalid allowed_origin '{}'", config.allowed_origin))?;
    let app = create_router(app_state, allowed_origin);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen_addr '{}'", config.listen_addr))?;
    let listener = TcpListener::bind(addr).await?;
    info!("Pawn ledger listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
