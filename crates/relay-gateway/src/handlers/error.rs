//! Handler error types

use crate::protocol::CloseCode;
use relay_common::ErrorResponse;
use relay_core::DomainError;
use thiserror::Error;

/// Handler error type
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Payload missing or of the wrong shape
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Payload fields out of range
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Domain value rejected
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HandlerError {
    /// Get an error code string for the ERROR event
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidPayload(_) => "INVALID_PAYLOAD",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Domain(e) => e.code(),
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if the connection may stay open after this error
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }

    /// Convert to a close code (if the connection must be closed)
    pub fn to_close_code(&self) -> Option<CloseCode> {
        match self {
            Self::InvalidPayload(_) | Self::Validation(_) | Self::Domain(_) => None,
            Self::Internal(_) => Some(CloseCode::UnknownError),
        }
    }

    /// Build the body of the ERROR event sent back to the client
    pub fn to_error_response(&self) -> ErrorResponse {
        match self {
            Self::Domain(e) => ErrorResponse::from(e),
            Self::Validation(errors) => {
                let mut fields: Vec<String> = errors
                    .field_errors()
                    .keys()
                    .map(|field| field.to_string())
                    .collect();
                fields.sort();
                ErrorResponse::new(self.error_code(), self.to_string())
                    .with_details(serde_json::json!({ "fields": fields }))
            }
            _ => ErrorResponse::new(self.error_code(), self.to_string()),
        }
    }
}

/// Handler result type
pub type HandlerResult<T> = Result<T, HandlerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::JoinPayload;
    use validator::Validate;

    #[test]
    fn test_recoverable_errors_keep_connection() {
        let err = HandlerError::InvalidPayload("Invalid Join payload".to_string());
        assert!(err.is_recoverable());
        assert_eq!(err.to_close_code(), None);

        let err = HandlerError::Domain(DomainError::InvalidUsername("blank".to_string()));
        assert!(err.is_recoverable());
        assert_eq!(err.error_code(), "INVALID_USERNAME");
    }

    #[test]
    fn test_internal_error_closes() {
        let err = HandlerError::Internal("queue closed".to_string());
        assert!(!err.is_recoverable());
        assert_eq!(err.to_close_code(), Some(CloseCode::UnknownError));
    }

    #[test]
    fn test_validation_error_response_lists_fields() {
        let errors = JoinPayload::new("r".repeat(65), "x".repeat(40)).validate().unwrap_err();
        let response = HandlerError::from(errors).to_error_response();

        assert_eq!(response.code, "VALIDATION_ERROR");
        let details = response.details.unwrap();
        assert_eq!(details["fields"].as_array().map(Vec::len), Some(2));
    }
}
