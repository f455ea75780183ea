//! Display name a connection announces itself with

use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Display name of a connection within a room
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Maximum length in characters
    pub const MAX_LEN: usize = 32;

    /// Validate and build a username (trimmed, non-blank, no control characters)
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, DomainError> {
        let trimmed = raw.as_ref().trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidUsername("must not be blank".to_string()));
        }
        if trimmed.chars().count() > Self::MAX_LEN {
            return Err(DomainError::InvalidUsername(format!(
                "must be at most {} characters",
                Self::MAX_LEN
            )));
        }
        if trimmed.chars().any(char::is_control) {
            return Err(DomainError::InvalidUsername(
                "must not contain control characters".to_string(),
            ));
        }

        Ok(Self(trimmed.to_string()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Username {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Username> for String {
    fn from(name: Username) -> Self {
        name.0
    }
}
