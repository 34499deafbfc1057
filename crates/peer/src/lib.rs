//! Signaling peer — a small WebSocket client for a relayer.

pub mod cli;
pub mod relay_client;
