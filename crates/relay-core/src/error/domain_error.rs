//! Domain errors - error types for the domain layer

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Invalid room code: {0}")]
    InvalidRoomCode(String),

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Invalid connection id: {0}")]
    InvalidConnectionId(String),
}

impl DomainError {
    /// Get an error code string for client-facing error events
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRoomCode(_) => "INVALID_ROOM_CODE",
            Self::InvalidUsername(_) => "INVALID_USERNAME",
            Self::InvalidConnectionId(_) => "INVALID_CONNECTION_ID",
        }
    }
}
