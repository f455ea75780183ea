//! WebSocket close codes
//!
//! Only protocol violations and liveness failures close a socket. Bad input
//! inside a well-formed text frame is answered with an ERROR dispatch instead.

use serde::{Deserialize, Serialize};

/// Application close codes (4000-4999 range)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum CloseCode {
    /// Internal failure while serving the connection
    UnknownError = 4000,
    /// The client sent an op code only the server may send
    UnknownOpcode = 4001,
    /// The client sent a binary frame
    DecodeError = 4002,
    /// No heartbeat arrived within the configured timeout
    SessionTimeout = 4009,
}

impl CloseCode {
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Check if the client broke the wire protocol
    #[must_use]
    pub const fn is_protocol_violation(self) -> bool {
        matches!(self, Self::UnknownOpcode | Self::DecodeError)
    }

    /// Reason text carried in the close frame
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::UnknownError => "internal relay error",
            Self::UnknownOpcode => "op code not accepted from clients",
            Self::DecodeError => "binary frames are not supported",
            Self::SessionTimeout => "heartbeat timeout",
        }
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}/{}", self, self.as_u16())
    }
}

impl From<CloseCode> for u16 {
    fn from(code: CloseCode) -> Self {
        code.as_u16()
    }
}
