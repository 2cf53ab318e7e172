//! Data model exchanged with the TM1 REST API.

mod element;
mod element_attribute;
mod tree;

pub use element::{Element, ElementType};
pub use element_attribute::{AttributeType, ElementAttribute};
pub use tree::ConsolidationNode;
