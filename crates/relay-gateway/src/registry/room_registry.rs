//! Room registry
//!
//! Rooms live in a `DashMap` and each guards its own member set, so joins and
//! leaves in different rooms never contend.

use super::Room;
use crate::connection::Connection;
use dashmap::DashMap;
use relay_core::{ConnectionId, RoomCode};
use std::sync::Arc;

/// Mapping from room code to room
///
/// Rooms are created lazily on first join and are never removed.
pub struct RoomRegistry {
    rooms: DashMap<RoomCode, Arc<Room>>,
}

impl RoomRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    /// Create an empty registry wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Get a room, creating it empty on first use
    ///
    /// Every call for the same code returns the same instance.
    pub fn get_or_create(&self, code: &RoomCode) -> Arc<Room> {
        if let Some(room) = self.rooms.get(code) {
            return room.clone();
        }

        self.rooms
            .entry(code.clone())
            .or_insert_with(|| {
                tracing::debug!(room = %code, "Room created");
                Arc::new(Room::new(code.clone()))
            })
            .clone()
    }

    /// Get an existing room
    pub fn get(&self, code: &RoomCode) -> Option<Arc<Room>> {
        self.rooms.get(code).map(|r| r.clone())
    }

    /// Put `connection` in room `code`, leaving its previous room first
    ///
    /// Returns the room it left, if that room differs from `code`.
    pub fn join(&self, connection: &Arc<Connection>, code: RoomCode) -> Option<RoomCode> {
        let mut slot = connection.room_slot();

        let previous = match slot.take() {
            Some(current) if current == code => None,
            Some(current) => {
                if let Some(room) = self.get(&current) {
                    room.remove(connection.id());
                }
                Some(current)
            }
            None => None,
        };

        self.get_or_create(&code).insert(connection.clone());

        tracing::debug!(
            connection_id = %connection.id(),
            room = %code,
            previous = ?previous.as_ref().map(RoomCode::as_str),
            "Connection joined room"
        );

        *slot = Some(code);
        previous
    }

    /// Remove `connection` from its current room
    ///
    /// Returns the room it left, or `None` if it was not in one.
    pub fn leave(&self, connection: &Connection) -> Option<RoomCode> {
        let mut slot = connection.room_slot();
        let current = slot.take()?;

        if let Some(room) = self.get(&current) {
            room.remove(connection.id());
        }

        tracing::debug!(
            connection_id = %connection.id(),
            room = %current,
            "Connection left room"
        );

        Some(current)
    }

    /// Snapshot of the members of `code`; empty if the room does not exist
    pub fn members_of(&self, code: &RoomCode) -> Vec<Arc<Connection>> {
        self.get(code).map(|room| room.snapshot()).unwrap_or_default()
    }

    /// Number of members in `code`; zero if the room does not exist
    pub fn member_count(&self, code: &RoomCode) -> usize {
        self.get(code).map_or(0, |room| room.len())
    }

    /// Check if `id` is a member of `code`
    pub fn is_member(&self, code: &RoomCode, id: ConnectionId) -> bool {
        self.get(code).is_some_and(|room| room.contains(id))
    }

    /// Number of rooms ever created
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Codes of all rooms
    pub fn room_codes(&self) -> Vec<RoomCode> {
        self.rooms.iter().map(|r| r.key().clone()).collect()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RoomRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomRegistry")
            .field("rooms", &self.rooms.len())
            .finish()
    }
}
