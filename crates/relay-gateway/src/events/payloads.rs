//! Event payload definitions

use super::GatewayEventType;
use relay_common::ErrorResponse;
use relay_core::RelayEvent;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// SYSTEM_MESSAGE event payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemMessagePayload {
    pub text: String,
}

/// A dispatch event ready to be stamped with a per-connection sequence
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchEvent {
    pub event_type: GatewayEventType,
    pub data: Value,
}

impl DispatchEvent {
    #[must_use]
    pub fn new(event_type: GatewayEventType, data: Value) -> Self {
        Self { event_type, data }
    }

    /// Error event for a single connection
    #[must_use]
    pub fn error(response: &ErrorResponse) -> Self {
        Self::new(
            GatewayEventType::Error,
            serde_json::to_value(response).unwrap_or_default(),
        )
    }
}

impl From<&RelayEvent> for DispatchEvent {
    fn from(event: &RelayEvent) -> Self {
        match event {
            RelayEvent::System { text } => Self::new(
                GatewayEventType::SystemMessage,
                serde_json::to_value(SystemMessagePayload { text: text.clone() })
                    .unwrap_or_default(),
            ),
            RelayEvent::Chat(payload) => Self::new(GatewayEventType::ChatMessage, payload.clone()),
            RelayEvent::Media(payload) => {
                Self::new(GatewayEventType::MediaMessage, payload.clone())
            }
        }
    }
}
