//! # TM1 HTTP Transport
//!
//! `reqwest`-backed implementation of [`RestTransport`] for the TM1 REST API.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tm1_http::{Auth, RestClientConfig, RestClientTransport};
//! use tm1_transport_traits::{RequestOptions, RestTransport};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RestClientConfig {
//!         base_url: "https://tm1.example.com:8010".to_string(),
//!         auth: Auth::Basic {
//!             user: "admin".to_string(),
//!             password: "apple".to_string(),
//!         },
//!         ..Default::default()
//!     };
//!
//!     let transport = RestClientTransport::new(config)?;
//!     let response = transport
//!         .get("/api/v1/Configuration/ProductVersion/$value", &RequestOptions::default())
//!         .await?;
//!     println!("TM1 version {}", response.text());
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration from the environment
//!
//! [`RestClientConfig::from_env`] reads `TM1_BASE_URL`, `TM1_TIMEOUT_SECS`,
//! `TM1_TOKEN`, `TM1_USER`, `TM1_PASSWORD` and `TM1_NAMESPACE`.
//!
//! ## Security
//!
//! - Certificate validation is enabled by default
//! - Disabling certificate validation requires `TM1_ALLOW_INSECURE_TLS` to be set
//! - Credentials are redacted from `Debug` output and marked sensitive in headers
//! - Request/response size limits are enforced on every call

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all
)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod transport;

pub use transport::{Auth, RestClientConfig, RestClientTransport};

// Re-export common types from traits crate for convenience
pub use tm1_transport_traits::{
    LimitsConfig, RequestOptions, RestResponse, RestTransport, TimeoutConfig, TlsConfig,
    TransportError, TransportResult,
};
