//! Application error types
//!
//! Process-level failures (configuration, binding, serving) plus the error
//! payload sent to clients.

use relay_core::DomainError;
use serde::Serialize;
use std::fmt;

use crate::config::ConfigError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    // Startup errors
    #[error("Invalid listen address {addr}: {reason}")]
    InvalidAddress { addr: String, reason: String },

    #[error("Failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    // Runtime errors
    #[error("Server error: {0}")]
    Server(#[source] std::io::Error),
}

impl AppError {
    /// Get error code for logs
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::InvalidAddress { .. } => "INVALID_ADDRESS",
            Self::Bind { .. } => "BIND_ERROR",
            Self::Server(_) => "SERVER_ERROR",
        }
    }

    /// Create an invalid address error
    #[must_use]
    pub fn invalid_address(addr: impl fmt::Display, reason: impl fmt::Display) -> Self {
        Self::InvalidAddress {
            addr: addr.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Error payload sent to a single client
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create an error payload from a code and message
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Attach structured details
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<&DomainError> for ErrorResponse {
    fn from(err: &DomainError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}
