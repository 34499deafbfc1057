//! Signaling message model.

use serde::{Deserialize, Serialize};

/// A message exchanged through the relay.
///
/// `payload` is opaque to the relay: offers, answers and candidates pass
/// through untouched. `sender` is always set by the relay from the
/// originating connection; whatever a client puts there is discarded.
/// `recipient` is carried along but does not narrow delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalMessage {
    #[serde(default)]
    pub r#type: String,
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
}

impl SignalMessage {
    pub fn new(r#type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            r#type: r#type.into(),
            payload,
            sender: None,
            recipient: None,
        }
    }

    /// Replace the sender with the relay-assigned identity.
    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }
}

/// Well-known message types. The relay accepts any string.
pub mod ws_types {
    pub const OFFER: &str = "offer";
    pub const ANSWER: &str = "answer";
    pub const CANDIDATE: &str = "candidate";
    pub const CHAT: &str = "chat";
}
