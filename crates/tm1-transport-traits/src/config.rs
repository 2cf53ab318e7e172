//! Settings shared by transport implementations.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the server certificate is checked.
///
/// TM1 servers are commonly reached over HTTPS with a certificate from an
/// internal CA; prefer adding that CA to `custom_ca_certs` over turning
/// validation off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsConfig {
    /// Reject servers whose certificate does not validate.
    pub validate_certificates: bool,

    /// Extra trust anchors, each PEM or DER encoded.
    pub custom_ca_certs: Option<Vec<Vec<u8>>>,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            validate_certificates: true,
            custom_ca_certs: None,
        }
    }
}

impl TlsConfig {
    /// Trust an additional CA certificate.
    #[must_use]
    pub fn with_ca_cert(mut self, cert: impl Into<Vec<u8>>) -> Self {
        self.custom_ca_certs
            .get_or_insert_with(Vec::new)
            .push(cert.into());
        self
    }
}

/// Body size ceilings, in bytes. `None` disables a check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Largest accepted response body.
    pub max_response_size: Option<usize>,

    /// Largest request body the transport will send.
    pub max_request_size: Option<usize>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            // Element listings of large dimensions run into the hundreds of MB
            max_response_size: Some(256 * 1024 * 1024),
            max_request_size: Some(4 * 1024 * 1024),
        }
    }
}

/// Connect and per-request deadlines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Time allowed to establish a connection.
    pub connect: Duration,

    /// Time allowed for one request, body included. `None` waits forever.
    pub request: Option<Duration>,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(30),
            request: Some(Duration::from_secs(60)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert!(TlsConfig::default().validate_certificates);
        assert_eq!(
            LimitsConfig::default().max_request_size,
            Some(4 * 1024 * 1024)
        );
        assert_eq!(
            TimeoutConfig::default().request,
            Some(Duration::from_secs(60))
        );
    }

    #[test]
    fn test_extra_ca_certs_accumulate() {
        let tls = TlsConfig::default()
            .with_ca_cert(b"first".to_vec())
            .with_ca_cert("second");
        assert_eq!(
            tls.custom_ca_certs,
            Some(vec![b"first".to_vec(), b"second".to_vec()])
        );
        assert!(tls.validate_certificates);
    }
}
