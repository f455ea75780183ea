//! Payload definitions for non-opaque messages

use relay_core::{DomainError, RoomCode, Username};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Payload for op 10 (Hello)
///
/// Sent by the server immediately after connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

impl HelloPayload {
    /// Default heartbeat interval (45 seconds)
    pub const DEFAULT_HEARTBEAT_INTERVAL: u64 = 45_000;

    /// Create a new Hello payload with default interval
    #[must_use]
    pub fn new() -> Self {
        Self {
            heartbeat_interval: Self::DEFAULT_HEARTBEAT_INTERVAL,
        }
    }

    /// Create a Hello payload with custom interval
    #[must_use]
    pub fn with_interval(heartbeat_interval: u64) -> Self {
        Self { heartbeat_interval }
    }
}

impl Default for HelloPayload {
    fn default() -> Self {
        Self::new()
    }
}

/// Payload for op 2 (Join)
///
/// Fields are trimmed on the way in. Blank values pass validation and are
/// rejected by the domain newtypes in [`JoinPayload::into_parts`].
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JoinPayload {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(max = 64, message = "Room code must be at most 64 characters"))]
    pub room_code: String,

    #[serde(deserialize_with = "trimmed")]
    #[validate(length(max = 32, message = "Username must be at most 32 characters"))]
    pub username: String,
}

fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.trim().to_string())
}

impl JoinPayload {
    #[must_use]
    pub fn new(room_code: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            room_code: room_code.into(),
            username: username.into(),
        }
    }

    /// Convert into validated domain values
    pub fn into_parts(self) -> Result<(RoomCode, Username), DomainError> {
        Ok((RoomCode::parse(&self.room_code)?, Username::parse(&self.username)?))
    }
}
