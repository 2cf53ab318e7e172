//! Error types for the element metadata client.

use thiserror::Error;
use tm1_transport_traits::TransportError;

/// Result type for element operations
pub type ElementResult<T> = Result<T, ElementError>;

/// Error type for element operations
#[derive(Debug, Error)]
pub enum ElementError {
    /// The transport failed or the server answered with a non-success status
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// An expected field is absent from a response body
    #[error("Missing field '{field}' in {context}")]
    MissingField {
        /// Name of the absent field
        field: String,
        /// What was being parsed
        context: String,
    },

    /// A response body has an unexpected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ElementError {
    /// Create a missing-field error
    #[must_use]
    pub fn missing_field(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
            context: context.into(),
        }
    }

    /// Create an invalid-response error
    #[must_use]
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Create a serialization error
    #[must_use]
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Returns `true` when the server reported the addressed object as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_not_found())
    }

    /// HTTP status reported by the server, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Transport(e) => e.status_code(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ElementError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
