//! # TM1 Elements
//!
//! Client for the element metadata of TM1 hierarchies: elements, attributes,
//! levels and consolidation trees.
//!
//! [`ElementService`] turns each call into an OData URL (and, for attribute
//! queries, MDX text), sends it through an injected [`RestTransport`] and
//! parses the JSON answer.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use tm1_elements::ElementService;
//! use tm1_http::{RestClientConfig, RestClientTransport};
//! use tm1_transport_traits::RequestOptions;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = RestClientTransport::new(RestClientConfig::from_env())?;
//!     let elements = ElementService::from_rest(Arc::new(transport));
//!     let options = RequestOptions::default();
//!
//!     for leaf in elements
//!         .get_leaves_under_consolidation("Region", "Region", "Europe", None, &options)
//!         .await?
//!     {
//!         println!("{leaf}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Names
//!
//! Names are embedded in URLs as OData string literals (see [`format_url`])
//! and in MDX between brackets. Bracket escaping inside MDX is left to the
//! caller.
//!
//! Results keyed by element name use the case- and space-insensitive
//! containers from this crate, matching how TM1 compares names.

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

mod collections;
mod error;
pub mod mdx;
mod mdx_executor;
mod objects;
pub mod query;
mod service;
mod url;

pub use collections::{
    CaseAndSpaceInsensitiveMap, CaseAndSpaceInsensitiveSet, CaseAndSpaceInsensitiveTuplesMap,
    normalize_name,
};
pub use error::{ElementError, ElementResult};
pub use mdx::ElementSelection;
pub use mdx_executor::{MdxExecutor, RestMdxExecutor, RowsAndValues};
pub use objects::{AttributeType, ConsolidationNode, Element, ElementAttribute, ElementType};
pub use query::{AttributeValue, SetMdxQuery};
pub use service::ElementService;
pub use url::{encode_literal, format_url};

pub use tm1_transport_traits::{RequestOptions, RestResponse, RestTransport};
