//! Read side of one connection.

use std::sync::Arc;

use axum::extract::ws::Message;
use futures_util::{Stream, StreamExt};
use shared::SignalMessage;

use super::connection::Connection;
use super::registry::Registry;
use super::Intake;
use crate::error::RelayError;

/// Run the ingress loop for `connection` until it fails.
///
/// Registers the connection, then forwards every decoded message, stamped
/// with the connection's address, to the broadcaster. Any read or decode
/// failure unregisters and closes the connection. Returns the reason the loop
/// ended.
pub async fn run<S>(
    connection: Arc<Connection>,
    mut inbound: S,
    registry: Arc<Registry>,
    intake: Intake,
) -> RelayError
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    registry.register(connection.clone());
    tracing::info!(conn_id = %connection.id(), addr = %connection.address(), "client connected");

    let reason = loop {
        let msg = match next_message(&mut inbound).await {
            Ok(msg) => msg.with_sender(connection.address()),
            Err(e) => break e,
        };
        // Suspends while the broadcaster is still busy with earlier messages.
        if intake.send(msg).await.is_err() {
            break RelayError::IntakeClosed;
        }
    };

    registry.unregister(connection.id());
    connection.close().await;
    tracing::info!(
        conn_id = %connection.id(),
        addr = %connection.address(),
        reason = %reason,
        "client disconnected"
    );
    reason
}

/// Wait for the next frame that carries a message. Control frames are skipped;
/// the transport answers pings on its own.
async fn next_message<S>(inbound: &mut S) -> Result<SignalMessage, RelayError>
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    loop {
        match inbound.next().await {
            Some(Ok(Message::Text(text))) => return Ok(serde_json::from_str(text.as_str())?),
            Some(Ok(Message::Binary(bytes))) => return Ok(serde_json::from_slice(&bytes)?),
            Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
            Some(Ok(Message::Close(_))) | None => return Err(RelayError::Closed),
            Some(Err(e)) => return Err(e.into()),
        }
    }
}
