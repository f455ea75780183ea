//! Room code - the name clients use to meet in a room

use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a room, as chosen by clients
///
/// Surrounding whitespace is trimmed. The trimmed value must be non-empty,
/// at most [`RoomCode::MAX_LEN`] characters, and free of control characters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Maximum length in characters
    pub const MAX_LEN: usize = 64;

    /// Validate and build a room code
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, DomainError> {
        let trimmed = raw.as_ref().trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidRoomCode("must not be blank".to_string()));
        }
        if trimmed.chars().count() > Self::MAX_LEN {
            return Err(DomainError::InvalidRoomCode(format!(
                "must be at most {} characters",
                Self::MAX_LEN
            )));
        }
        if trimmed.chars().any(char::is_control) {
            return Err(DomainError::InvalidRoomCode(
                "must not contain control characters".to_string(),
            ));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Get the code as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RoomCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

impl AsRef<str> for RoomCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
