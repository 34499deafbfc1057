//! A single client link as seen by the relay.

use std::fmt;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::{Sink, SinkExt};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::RelayError;

/// Outbound half of a connection: accepts serialized JSON text frames.
pub type OutboundSink = Pin<Box<dyn Sink<String, Error = RelayError> + Send>>;

/// Opaque connection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A live client connection.
///
/// Only the broadcaster writes and only the owning ingress loop reads; the
/// outbound lock keeps a broadcast write and a close from interleaving.
pub struct Connection {
    id: ConnectionId,
    address: String,
    outbound: Mutex<OutboundSink>,
    closed: AtomicBool,
}

impl Connection {
    pub fn new(address: impl Into<String>, outbound: OutboundSink) -> Self {
        Self {
            id: ConnectionId::new(),
            address: address.into(),
            outbound: Mutex::new(outbound),
            closed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Remote address; the identity stamped on messages this connection sends.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Write one text frame. Fails immediately once the connection is closed.
    pub async fn send(&self, text: String) -> Result<(), RelayError> {
        if self.is_closed() {
            return Err(RelayError::Closed);
        }
        self.outbound.lock().await.send(text).await
    }

    /// Close the transport. Only the first call does anything.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Err(e) = self.outbound.lock().await.close().await {
            tracing::debug!(conn_id = %self.id, addr = %self.address, error = %e, "close failed");
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("address", &self.address)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// In-memory connections for exercising the relay without sockets.
#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use futures_util::sink;
    use tokio::sync::mpsc;

    use super::*;

    /// A connection whose writes land in the returned receiver. Writes fail
    /// once the receiver is dropped.
    pub fn channel_connection(
        address: &str,
    ) -> (Arc<Connection>, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let outbound = sink::unfold(tx, |tx, text: String| async move {
            tx.send(text).map_err(|_| RelayError::Closed)?;
            Ok::<_, RelayError>(tx)
        });
        (Arc::new(Connection::new(address, Box::pin(outbound))), rx)
    }

    /// A connection whose transport is already gone.
    pub fn broken_connection(address: &str) -> Arc<Connection> {
        let outbound = sink::unfold((), |_, _text: String| async {
            Err::<(), RelayError>(RelayError::Closed)
        });
        Arc::new(Connection::new(address, Box::pin(outbound)))
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;

    #[tokio::test]
    async fn send_reaches_transport() {
        let (conn, mut rx) = channel_connection("10.0.0.1:4000");
        conn.send("hello".to_string()).await.unwrap();
        assert_eq!(rx.recv().await.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn send_after_close_fails() {
        let (conn, _rx) = channel_connection("10.0.0.1:4000");
        conn.close().await;
        assert!(conn.is_closed());
        assert!(conn.send("late".to_string()).await.is_err());
        // second close is a no-op
        conn.close().await;
    }

    #[tokio::test]
    async fn broken_transport_reports_error() {
        let conn = broken_connection("10.0.0.2:4000");
        assert!(conn.send("x".to_string()).await.is_err());
    }

    #[test]
    fn ids_are_unique() {
        let (a, _ra) = channel_connection("10.0.0.1:1");
        let (b, _rb) = channel_connection("10.0.0.1:1");
        assert_ne!(a.id(), b.id());
        assert_eq!(a.address(), b.address());
    }
}
