use std::fmt;

use serde::{Deserialize, Serialize};

/// Type tag of an element attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeType {
    /// Alternative name for the element
    Alias,
    /// Numeric value
    Numeric,
    /// Text value
    String,
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alias => write!(f, "Alias"),
            Self::Numeric => write!(f, "Numeric"),
            Self::String => write!(f, "String"),
        }
    }
}

/// An attribute defined on the elements of a hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementAttribute {
    /// Attribute name
    #[serde(rename = "Name")]
    pub name: String,
    /// Attribute type
    #[serde(rename = "Type")]
    pub attribute_type: AttributeType,
}

impl ElementAttribute {
    /// Create an attribute definition.
    #[must_use]
    pub fn new(name: impl Into<String>, attribute_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attribute_type,
        }
    }

    /// Returns `true` for alias attributes.
    pub fn is_alias(&self) -> bool {
        self.attribute_type == AttributeType::Alias
    }

    /// JSON payload sent when creating the attribute.
    pub fn body(&self) -> String {
        serde_json::json!({
            "Name": self.name,
            "Type": self.attribute_type,
        })
        .to_string()
    }
}
