//! Connection manager
//!
//! Tracks all live WebSocket connections using DashMap for thread-safe access.

use super::Connection;
use crate::protocol::GatewayMessage;
use dashmap::DashMap;
use relay_core::ConnectionId;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Tracks every live connection, joined to a room or not
pub struct ConnectionManager {
    /// Active connections by ID
    connections: DashMap<ConnectionId, Arc<Connection>>,
}

impl ConnectionManager {
    /// Create a new connection manager
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Create a new connection manager wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a new connection
    pub fn add_connection(&self, sender: mpsc::Sender<GatewayMessage>) -> Arc<Connection> {
        let connection = Connection::new(sender);
        self.connections.insert(connection.id(), connection.clone());

        tracing::debug!(connection_id = %connection.id(), "Connection added");

        connection
    }

    /// Remove a connection, returning it if it was registered
    ///
    /// Room membership is not touched here; callers leave the registry first.
    pub fn remove_connection(&self, id: ConnectionId) -> Option<Arc<Connection>> {
        let removed = self.connections.remove(&id).map(|(_, connection)| connection);

        if removed.is_some() {
            tracing::debug!(connection_id = %id, "Connection removed");
        }

        removed
    }

    /// Get the total number of active connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Check if a connection is registered
    pub fn has_connection(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("connections", &self.connections.len())
            .finish()
    }
}
