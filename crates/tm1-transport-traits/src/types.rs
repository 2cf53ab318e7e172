//! Core transport types.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::{TransportError, TransportResult};

/// HTTP verbs used against the TM1 REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// Read a resource.
    Get,
    /// Create a resource or invoke an action.
    Post,
    /// Partially update a resource.
    Patch,
    /// Remove a resource.
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Patch => write!(f, "PATCH"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// Per-call overrides forwarded verbatim to the transport.
///
/// Every client operation accepts one of these; `RequestOptions::default()`
/// means "use the transport's configuration".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Overrides the transport's request timeout for this call.
    pub timeout: Option<Duration>,

    /// Extra headers for this call. Later entries win over earlier ones and
    /// over the transport's default headers.
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    /// Create options without any overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a request timeout for this call.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add a header for this call.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Returns `true` when no override is set.
    pub fn is_empty(&self) -> bool {
        self.timeout.is_none() && self.headers.is_empty()
    }
}

/// A successful response from the TM1 REST API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestResponse {
    /// HTTP status code.
    pub status: u16,

    /// Raw response body.
    pub body: Bytes,
}

impl RestResponse {
    /// Creates a response from a status code and a body.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Decodes the body as JSON into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> TransportResult<T> {
        serde_json::from_slice(&self.body).map_err(TransportError::from)
    }

    /// Decodes the body as an untyped JSON value.
    pub fn json_value(&self) -> TransportResult<serde_json::Value> {
        self.json()
    }

    /// Returns the body as text, replacing invalid UTF-8 sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Returns the size of the body in bytes.
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Returns `true` when the body is empty (e.g. `204 No Content`).
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}
