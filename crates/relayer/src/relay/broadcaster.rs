//! Serialized fan-out of messages to every connection but the sender.

use std::sync::Arc;

use shared::SignalMessage;
use tokio::sync::mpsc;

use super::connection::{Connection, ConnectionId};
use super::registry::Registry;

/// Outcome of delivering one message.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Delivery {
    pub delivered: usize,
    pub pruned: Vec<ConnectionId>,
}

/// The single consumer of the intake channel.
pub struct Broadcaster {
    registry: Arc<Registry>,
    intake: mpsc::Receiver<SignalMessage>,
}

impl Broadcaster {
    pub fn new(registry: Arc<Registry>, intake: mpsc::Receiver<SignalMessage>) -> Self {
        Self { registry, intake }
    }

    /// Deliver messages in intake order until every intake sender is gone.
    pub async fn run(mut self) {
        while let Some(msg) = self.intake.recv().await {
            self.deliver(&msg).await;
        }
        tracing::debug!("broadcaster stopped");
    }

    /// Write `msg` to every registered connection except its sender.
    ///
    /// A failed write closes that connection; it is unregistered together
    /// with any other failures once the whole snapshot has been tried.
    pub async fn deliver(&self, msg: &SignalMessage) -> Delivery {
        self.deliver_to(msg, self.registry.snapshot()).await
    }

    /// Connections in `targets` may have been unregistered since the snapshot
    /// was taken; their writes fail and pruning them again is a no-op.
    async fn deliver_to(&self, msg: &SignalMessage, targets: Vec<Arc<Connection>>) -> Delivery {
        let Ok(text) = serde_json::to_string(msg) else {
            return Delivery::default();
        };

        let mut delivery = Delivery::default();
        for conn in targets {
            if msg.sender.as_deref() == Some(conn.address()) {
                continue;
            }
            match conn.send(text.clone()).await {
                Ok(()) => {
                    delivery.delivered += 1;
                    tracing::debug!(
                        conn_id = %conn.id(),
                        addr = %conn.address(),
                        msg_type = %msg.r#type,
                        "delivered message"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        conn_id = %conn.id(),
                        addr = %conn.address(),
                        error = %e,
                        "write failed, dropping client"
                    );
                    conn.close().await;
                    delivery.pruned.push(conn.id());
                }
            }
        }
        self.registry.unregister_all(&delivery.pruned);
        delivery
    }
}
