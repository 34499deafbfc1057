//! Shared wire types for the signaling relayer and peer client.

mod models;

pub use models::ws_types;
pub use models::SignalMessage;
