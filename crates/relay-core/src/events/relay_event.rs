//! Relay events
//!
//! The events a room fans out to its members. User-authored payloads are
//! opaque: the relay forwards them without inspecting or validating them.

use crate::Username;
use serde_json::Value;

/// An event delivered to the members of a room
#[derive(Debug, Clone, PartialEq)]
pub enum RelayEvent {
    /// Server-generated notification
    System { text: String },
    /// User-authored chat message
    Chat(Value),
    /// User-authored media message
    Media(Value),
}

impl RelayEvent {
    /// Announcement that `name` joined the room
    #[must_use]
    pub fn joined(name: &Username) -> Self {
        Self::System {
            text: format!("{name} joined the room"),
        }
    }

    /// Announcement that `name` left the room
    #[must_use]
    pub fn left(name: &Username) -> Self {
        Self::System {
            text: format!("{name} left the room"),
        }
    }

    /// Get the event kind as a short label (for logging)
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::System { .. } => "system",
            Self::Chat(_) => "chat",
            Self::Media(_) => "media",
        }
    }
}
