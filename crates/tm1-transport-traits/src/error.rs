//! Errors raised while talking to the TM1 REST API.

use std::time::Duration;
use thiserror::Error;

use crate::config::LimitsConfig;

/// Result alias used by every transport operation.
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Why a request produced no usable response.
///
/// Only [`TransportError::Status`] carries an HTTP status; every other
/// variant means the server's answer was never seen.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum TransportError {
    /// The server could not be reached.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status} for {url}: {body}")]
    Status {
        /// Status code
        status: u16,
        /// Request URL, relative to the server root
        url: String,
        /// Response body, usually an OData error document
        body: String,
    },

    /// A body could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// No complete response arrived within the request timeout.
    #[error("{operation} timed out after {timeout:?}; raise the request timeout for slow queries")]
    RequestTimeout {
        /// Method and URL of the request
        operation: String,
        /// The deadline that passed
        timeout: Duration,
    },

    /// The transport settings are unusable.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The connection broke while a request was in flight.
    #[error("IO error: {0}")]
    Io(String),

    /// A transport implementation hit an unexpected state.
    #[error("Internal error: {0}")]
    Internal(String),

    /// The request body is larger than `LimitsConfig::max_request_size`.
    #[error("Request body of {size} bytes exceeds the {max} byte limit")]
    RequestTooLarge {
        /// Body size
        size: usize,
        /// Configured limit
        max: usize,
    },

    /// The response body is larger than `LimitsConfig::max_response_size`.
    #[error("Response body of {size} bytes exceeds the {max} byte limit")]
    ResponseTooLarge {
        /// Body size
        size: usize,
        /// Configured limit
        max: usize,
    },
}

impl TransportError {
    /// Build a status error from its parts.
    #[must_use]
    pub fn status(status: u16, url: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            url: url.into(),
            body: body.into(),
        }
    }

    /// The HTTP status code, when the server produced one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` when the server reported the addressed object as absent.
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationFailed(err.to_string())
    }
}

fn exceeds(size: usize, max: Option<usize>) -> Option<usize> {
    max.filter(|max| size > *max)
}

/// Checks an outgoing body against `limits.max_request_size`.
pub fn validate_request_size(size: usize, limits: &LimitsConfig) -> TransportResult<()> {
    match exceeds(size, limits.max_request_size) {
        Some(max) => Err(TransportError::RequestTooLarge { size, max }),
        None => Ok(()),
    }
}

/// Checks a received body against `limits.max_response_size`.
pub fn validate_response_size(size: usize, limits: &LimitsConfig) -> TransportResult<()> {
    match exceeds(size, limits.max_response_size) {
        Some(max) => Err(TransportError::ResponseTooLarge { size, max }),
        None => Ok(()),
    }
}
