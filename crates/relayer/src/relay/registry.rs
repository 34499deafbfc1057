//! Set of connections eligible for broadcast.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::connection::{Connection, ConnectionId};

/// Registry of live connections.
///
/// The lock is never held across an await: the broadcaster iterates over a
/// [`snapshot`](Registry::snapshot), so an ingress loop unregistering mid
/// broadcast only affects the next snapshot.
#[derive(Default)]
pub struct Registry {
    connections: Mutex<HashMap<ConnectionId, Arc<Connection>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection. Registering the same connection twice is a no-op.
    pub fn register(&self, connection: Arc<Connection>) {
        self.connections
            .lock()
            .entry(connection.id())
            .or_insert(connection);
    }

    /// Remove a connection. Returns false if it was not registered.
    pub fn unregister(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(&id).is_some()
    }

    /// Remove several connections under one lock acquisition.
    pub fn unregister_all(&self, ids: &[ConnectionId]) {
        if ids.is_empty() {
            return;
        }
        let mut connections = self.connections.lock();
        for id in ids {
            connections.remove(id);
        }
    }

    /// Point-in-time copy of the registered connections.
    pub fn snapshot(&self) -> Vec<Arc<Connection>> {
        self.connections.lock().values().cloned().collect()
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.connections.lock().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.connections.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.lock().is_empty()
    }
}
