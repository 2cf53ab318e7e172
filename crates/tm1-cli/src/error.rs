//! Error types for CLI operations

use std::fmt;

use thiserror::Error;
use tm1_elements::ElementError;
use tm1_transport_traits::TransportError;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Failure reported by the element client
    #[error(transparent)]
    Element(#[from] ElementError),

    /// Transport could not be set up
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Invalid command arguments
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// JSON rendering error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// User-facing hints for resolving the error
    pub fn suggestions(&self) -> Vec<&'static str> {
        match self.category() {
            ErrorCategory::Connection => vec![
                "Check that the TM1 server is running and its REST API is enabled",
                "Verify --url (or TM1_BASE_URL), including the HTTP port",
            ],
            ErrorCategory::Authentication => vec![
                "Check --user/--password or TM1_USER/TM1_PASSWORD",
                "For CAM security also set --namespace",
            ],
            ErrorCategory::NotFound => vec![
                "Check the dimension, hierarchy and element names",
                "Use --hierarchy when the hierarchy name differs from the dimension",
            ],
            ErrorCategory::Timeout => vec!["Increase the timeout with --timeout"],
            ErrorCategory::User => vec!["Use --help to see the expected arguments"],
            _ => vec![],
        }
    }

    /// The error category for colored output
    pub fn category(&self) -> ErrorCategory {
        let transport = match self {
            Self::Element(ElementError::Transport(err)) | Self::Transport(err) => err,
            Self::Element(_) | Self::Json(_) => return ErrorCategory::Parsing,
            Self::InvalidArguments(_) => return ErrorCategory::User,
        };
        match transport {
            TransportError::ConnectionFailed(_) => ErrorCategory::Connection,
            TransportError::RequestTimeout { .. } => ErrorCategory::Timeout,
            TransportError::ConfigurationError(_) => ErrorCategory::Config,
            err => match err.status_code() {
                Some(401 | 403) => ErrorCategory::Authentication,
                Some(404) => ErrorCategory::NotFound,
                Some(_) => ErrorCategory::Server,
                None => ErrorCategory::Other,
            },
        }
    }
}

/// Error categories for colored output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Connection,
    Authentication,
    NotFound,
    User,
    Server,
    Timeout,
    Parsing,
    Config,
    Other,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection => write!(f, "Connection"),
            Self::Authentication => write!(f, "Authentication"),
            Self::NotFound => write!(f, "Not Found"),
            Self::User => write!(f, "User Input"),
            Self::Server => write!(f, "Server"),
            Self::Timeout => write!(f, "Timeout"),
            Self::Parsing => write!(f, "Parsing"),
            Self::Config => write!(f, "Configuration"),
            Self::Other => write!(f, "Error"),
        }
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let not_found = CliError::from(ElementError::from(TransportError::status(
            404,
            "/api/v1/Dimensions('Region')",
            "",
        )));
        assert_eq!(not_found.category(), ErrorCategory::NotFound);
        assert!(!not_found.suggestions().is_empty());

        let denied = CliError::from(TransportError::status(401, "/api/v1/Dimensions", ""));
        assert_eq!(denied.category(), ErrorCategory::Authentication);

        let down = CliError::from(TransportError::ConnectionFailed("refused".to_string()));
        assert_eq!(down.category(), ErrorCategory::Connection);

        let malformed = CliError::from(ElementError::missing_field("value", "element listing"));
        assert_eq!(malformed.category(), ErrorCategory::Parsing);

        let user = CliError::InvalidArguments("not a number".to_string());
        assert_eq!(user.category(), ErrorCategory::User);
        assert_eq!(user.to_string(), "Invalid arguments: not a number");
    }
}
