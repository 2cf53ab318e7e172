use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Type tag of a dimension element.
///
/// Serialized by name (`"Numeric"`); deserialized from either the name or
/// the numeric code used in OData filters (`1`, `2`, `3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawElementType")]
pub enum ElementType {
    /// Leaf element holding numbers
    Numeric,
    /// Leaf element holding text
    String,
    /// Element aggregating its components
    Consolidated,
}

impl ElementType {
    /// Code used for this type in `$filter=Type eq ...` expressions.
    pub const fn code(self) -> u8 {
        match self {
            Self::Numeric => 1,
            Self::String => 2,
            Self::Consolidated => 3,
        }
    }

    /// Returns `true` for numeric and string elements.
    pub const fn is_leaf(self) -> bool {
        !matches!(self, Self::Consolidated)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => write!(f, "Numeric"),
            Self::String => write!(f, "String"),
            Self::Consolidated => write!(f, "Consolidated"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawElementType {
    Code(u8),
    Name(String),
}

impl TryFrom<RawElementType> for ElementType {
    type Error = String;

    fn try_from(raw: RawElementType) -> Result<Self, Self::Error> {
        match raw {
            RawElementType::Code(1) => Ok(Self::Numeric),
            RawElementType::Code(2) => Ok(Self::String),
            RawElementType::Code(3) => Ok(Self::Consolidated),
            RawElementType::Code(code) => Err(format!("unknown element type code {code}")),
            RawElementType::Name(name) => match name.to_ascii_lowercase().as_str() {
                "numeric" => Ok(Self::Numeric),
                "string" => Ok(Self::String),
                "consolidated" => Ok(Self::Consolidated),
                _ => Err(format!("unknown element type '{name}'")),
            },
        }
    }
}

/// A dimension element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Element name
    #[serde(rename = "Name")]
    pub name: String,
    /// Element type
    #[serde(rename = "Type")]
    pub element_type: ElementType,
    /// Fully qualified name, e.g. `[Region].[Region].[Europe]`
    #[serde(rename = "UniqueName", default, skip_serializing_if = "Option::is_none")]
    pub unique_name: Option<String>,
    /// Position within the hierarchy
    #[serde(rename = "Index", default, skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
    /// Level in the hierarchy (leaves are level 0)
    #[serde(rename = "Level", default, skip_serializing_if = "Option::is_none")]
    pub level: Option<i64>,
    /// Attribute values keyed by attribute name
    #[serde(
        rename = "Attributes",
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "HashMap::is_empty"
    )]
    pub attributes: HashMap<String, Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<HashMap<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<HashMap<String, Value>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl Element {
    /// Create an element without attributes.
    #[must_use]
    pub fn new(name: impl Into<String>, element_type: ElementType) -> Self {
        Self {
            name: name.into(),
            element_type,
            unique_name: None,
            index: None,
            level: None,
            attributes: HashMap::new(),
        }
    }

    /// Set an attribute value.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// JSON payload sent when creating or updating the element.
    pub fn body(&self) -> String {
        serde_json::json!({
            "Name": self.name,
            "Type": self.element_type,
        })
        .to_string()
    }
}
