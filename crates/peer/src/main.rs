//! Signaling peer — terminal client for a relayer.
//!
//! Optional env: RELAY_URL, RELAY_ORIGIN

use std::env;

use clap::Parser;
use peer::{cli, relay_client};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries relayed messages; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    let url = cli
        .url
        .or_else(|| env::var("RELAY_URL").ok())
        .unwrap_or_else(|| "ws://localhost:8080/ws".to_string());
    let origin = cli.origin.or_else(|| env::var("RELAY_ORIGIN").ok());
    let origin = origin.as_deref();

    match cli.command.unwrap_or(cli::Commands::Chat) {
        cli::Commands::Chat => relay_client::run_chat(&url, origin).await?,
        cli::Commands::Listen => relay_client::run_listen(&url, origin).await?,
        cli::Commands::Send { kind, payload } => {
            relay_client::send_once(&url, origin, &kind, payload.as_deref()).await?
        }
    }

    Ok(())
}
