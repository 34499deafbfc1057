//! Signaling relayer — WebSocket fan-out server.
//!
//! Optional env: HOST, PORT, WS_PATH, ALLOWED_ORIGIN, INTAKE_CAPACITY

use std::sync::Arc;

use anyhow::Context;
use relayer::{api, config, relay};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = config::Config::from_env().context("config")?;
    let config = Arc::new(config);

    let (relay, _broadcaster) = relay::RelayState::spawn(config.intake_capacity);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(
        "Relayer listening on {} (ws path {})",
        listener.local_addr()?,
        config.ws_path
    );

    let state = api::AppState { relay, config };
    relayer::serve(listener, state, shutdown_signal()).await?;

    tracing::info!("Relayer stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}
