mod api;
mod cli;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use cometd_mock_engine::Dispatcher;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::{AppState, build_router};
use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;
    init_tracing(config.debug)?;

    info!("starting cometd mock server");
    let dispatcher = Dispatcher::new(config).context("failed to initialize dispatcher")?;
    let config = dispatcher.config();
    info!(
        connect_interval = config.connect_interval,
        connect_timeout = config.connect_timeout,
        reconnection_interval = ?config.reconnection_interval,
        reconnection_interval_seconds = ?config.reconnection_interval_seconds,
        expire_after_count = ?config.expire_after_count,
        expire_after_seconds = ?config.expire_after_seconds,
        no_validation = config.no_validation,
        "mock settings loaded"
    );
    let address = format!("{}:{}", config.host, config.port);

    let app = build_router(AppState::new(Arc::new(dispatcher)));
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!(address = %listener.local_addr()?, "server is ready, press Ctrl+C to shut down");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated with an error")?;

    info!("server shutdown complete");
    Ok(())
}

fn init_tracing(debug: bool) -> anyhow::Result<()> {
    let default_level = if debug { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received, stopping server");
}
