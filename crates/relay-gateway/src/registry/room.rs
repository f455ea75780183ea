//! A single room and its members

use crate::connection::Connection;
use parking_lot::RwLock;
use relay_core::{ConnectionId, RoomCode};
use std::collections::HashMap;
use std::sync::Arc;

/// A named group of connections
///
/// Membership is changed only through [`RoomRegistry`](super::RoomRegistry),
/// which keeps each connection in at most one room.
pub struct Room {
    code: RoomCode,
    members: RwLock<HashMap<ConnectionId, Arc<Connection>>>,
}

impl Room {
    pub(crate) fn new(code: RoomCode) -> Self {
        Self {
            code,
            members: RwLock::new(HashMap::new()),
        }
    }

    /// Get the room code
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Add a member; returns false if it was already present
    pub(crate) fn insert(&self, connection: Arc<Connection>) -> bool {
        self.members
            .write()
            .insert(connection.id(), connection)
            .is_none()
    }

    /// Remove a member; returns false if it was not present
    pub(crate) fn remove(&self, id: ConnectionId) -> bool {
        self.members.write().remove(&id).is_some()
    }

    /// Check if a connection is a member
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.members.read().contains_key(&id)
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.read().is_empty()
    }

    /// Copy of the current member set, taken under the read lock
    pub fn snapshot(&self) -> Vec<Arc<Connection>> {
        self.members.read().values().cloned().collect()
    }
}

impl std::fmt::Debug for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Room")
            .field("code", &self.code)
            .field("members", &self.len())
            .finish()
    }
}
