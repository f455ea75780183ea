//! Gateway event types
//!
//! Event names sent in the `t` field of dispatch messages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Gateway event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayEventType {
    /// Server notification to a room (e.g. join announcement)
    SystemMessage,
    /// Chat message relayed to a room
    ChatMessage,
    /// Media message relayed to a room
    MediaMessage,
    /// Recoverable error, sent only to the offending connection
    Error,
}

impl GatewayEventType {
    /// Get the string representation of the event type
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SystemMessage => "SYSTEM_MESSAGE",
            Self::ChatMessage => "CHAT_MESSAGE",
            Self::MediaMessage => "MEDIA_MESSAGE",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for GatewayEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<GatewayEventType> for String {
    fn from(event: GatewayEventType) -> Self {
        event.as_str().to_string()
    }
}
