//! Connection registry and broadcast engine.

pub mod broadcaster;
pub mod connection;
pub mod ingress;
pub mod registry;

use std::sync::Arc;

use futures_util::Stream;
use shared::SignalMessage;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub use broadcaster::{Broadcaster, Delivery};
pub use connection::{Connection, ConnectionId, OutboundSink};
pub use registry::Registry;

use crate::error::RelayError;

/// Sending half of the handoff channel into the broadcaster.
pub type Intake = mpsc::Sender<SignalMessage>;

/// Relay state: the registry plus the intake of the running broadcaster.
#[derive(Clone)]
pub struct RelayState {
    registry: Arc<Registry>,
    intake: Intake,
}

impl RelayState {
    /// Create the registry and spawn the broadcaster task. Ingress loops block
    /// once `intake_capacity` messages are waiting.
    pub fn spawn(intake_capacity: usize) -> (Self, JoinHandle<()>) {
        let registry = Arc::new(Registry::new());
        let (intake, rx) = mpsc::channel(intake_capacity.max(1));
        let handle = tokio::spawn(Broadcaster::new(registry.clone(), rx).run());
        (Self { registry, intake }, handle)
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Run the ingress loop for a freshly upgraded connection.
    pub async fn attach<S>(&self, connection: Arc<Connection>, inbound: S) -> RelayError
    where
        S: Stream<Item = Result<axum::extract::ws::Message, axum::Error>> + Unpin,
    {
        ingress::run(
            connection,
            inbound,
            self.registry.clone(),
            self.intake.clone(),
        )
        .await
    }
}
