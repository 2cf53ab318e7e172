//! # TM1 Transport Traits
//!
//! The seam between the TM1 clients and the wire. Clients compose OData URLs
//! and JSON bodies and hand them to a [`RestTransport`]; the transport owns
//! authentication, sessions and HTTP.
//!
//! A transport answers each request with a [`RestResponse`] for a 2xx status
//! or a [`TransportError`] otherwise. Per-call overrides travel in
//! [`RequestOptions`].
//!
//! ```rust,ignore
//! use tm1_transport_traits::{BoxFuture, RequestOptions, RestResponse, RestTransport, TransportResult};
//!
//! #[derive(Debug)]
//! struct Recorded(Vec<String>);
//!
//! impl RestTransport for Recorded {
//!     fn get<'a>(&'a self, url: &'a str, options: &'a RequestOptions) -> BoxFuture<'a, TransportResult<RestResponse>> {
//!         Box::pin(async move { Ok(RestResponse::new(200, "{}")) })
//!     }
//!     // post, patch and delete follow the same shape
//! }
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all
)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::must_use_candidate
)]

mod config;
mod error;
mod traits;
mod types;

pub use config::{LimitsConfig, TimeoutConfig, TlsConfig};
pub use error::{TransportError, TransportResult};
pub use traits::{BoxFuture, RestTransport};
pub use types::{HttpMethod, RequestOptions, RestResponse};

pub use error::{validate_request_size, validate_response_size};
