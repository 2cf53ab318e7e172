//! OData query builders for the requests that take more than a fixed URL.

use std::fmt;

use crate::url::{encode_literal, format_url};

/// Expansion depth used when none is requested.
pub const DEFAULT_MAX_DEPTH: usize = 99;

/// A value compared against an attribute in an OData `$filter`.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Text; rendered as a quoted string literal
    String(String),
    /// Number; rendered bare
    ///
    /// Must be finite. `NaN` and the infinities have no OData literal and
    /// render as `NaN`/`inf`, which the server rejects.
    Numeric(f64),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(value) => write!(f, "{value}"),
            Self::Numeric(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Does not check finiteness; see [`AttributeValue::Numeric`].
impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Numeric(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        Self::Numeric(f64::from(value))
    }
}

impl From<i64> for AttributeValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        Self::Numeric(value as f64)
    }
}

/// URL selecting the names of the elements whose `attribute` equals `value`.
///
/// Attribute names are addressed without spaces in `Attributes/...` paths.
pub fn filter_by_attribute_url(
    dimension: &str,
    hierarchy: &str,
    attribute: &str,
    value: &AttributeValue,
) -> String {
    let attribute = attribute.replace(' ', "");
    let literal = match value {
        AttributeValue::String(text) => format!("'{}'", encode_literal(text)),
        AttributeValue::Numeric(_) => encode_literal(&value.to_string()),
    };
    format!(
        "{}?$expand=Elements($filter = Attributes/{} eq {};$select=Name)",
        format_url("/api/v1/Dimensions('{}')/Hierarchies('{}')", &[dimension, hierarchy]),
        encode_literal(&attribute),
        literal,
    )
}

/// URL expanding `consolidation` through its components, `depth` levels deep.
///
/// Nothing below `depth` is returned; deeper members are silently absent.
pub fn consolidation_url(dimension: &str, hierarchy: &str, consolidation: &str, depth: usize) -> String {
    let mut url = format_url(
        "/api/v1/Dimensions('{}')/Hierarchies('{}')/Elements('{}')?$select=Name,Type&$expand=Components(",
        &[dimension, hierarchy, consolidation],
    );
    for _ in 0..depth {
        url.push_str("$select=Name,Type;$expand=Components(");
    }
    // the innermost expansion is left open
    url.pop();
    url.push_str(&")".repeat(depth));
    url
}

/// Projection for executing an MDX set expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetMdxQuery {
    /// Maximum number of tuples; `None` or `Some(0)` returns all
    pub top_records: Option<usize>,
    /// Member fields to select; empty selects `Name`
    pub member_properties: Vec<String>,
    /// Parent fields to select; empty omits the parent
    pub parent_properties: Vec<String>,
    /// Element fields to select; empty omits the element
    pub element_properties: Vec<String>,
}

impl Default for SetMdxQuery {
    fn default() -> Self {
        Self {
            top_records: None,
            member_properties: vec!["Name".to_string(), "Weight".to_string()],
            parent_properties: vec!["Name".to_string(), "UniqueName".to_string()],
            element_properties: vec!["Type".to_string(), "Level".to_string()],
        }
    }
}

fn owned(properties: &[&str]) -> Vec<String> {
    properties.iter().map(|p| (*p).to_string()).collect()
}

impl SetMdxQuery {
    /// Create a query with the default projection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the number of tuples.
    #[must_use]
    pub fn with_top(mut self, top_records: usize) -> Self {
        self.top_records = Some(top_records);
        self
    }

    /// Set the member fields.
    #[must_use]
    pub fn with_member_properties(mut self, properties: &[&str]) -> Self {
        self.member_properties = owned(properties);
        self
    }

    /// Set the parent fields; empty omits the parent.
    #[must_use]
    pub fn with_parent_properties(mut self, properties: &[&str]) -> Self {
        self.parent_properties = owned(properties);
        self
    }

    /// Set the element fields; empty omits the element.
    #[must_use]
    pub fn with_element_properties(mut self, properties: &[&str]) -> Self {
        self.element_properties = owned(properties);
        self
    }

    /// URL of the `ExecuteMDXSetExpression` request for this projection.
    pub fn url(&self) -> String {
        let top = match self.top_records {
            Some(top) if top > 0 => format!("$top={top};"),
            _ => String::new(),
        };

        let members = if self.member_properties.is_empty() {
            "Name".to_string()
        } else {
            self.member_properties.join(",")
        };

        let mut expansions = Vec::new();
        if !self.parent_properties.is_empty() {
            expansions.push(format!("Parent($select={})", self.parent_properties.join(",")));
        }
        if !self.element_properties.is_empty() {
            expansions.push(format!("Element($select={})", self.element_properties.join(",")));
        }
        let expand = if expansions.is_empty() {
            String::new()
        } else {
            format!(";$expand={}", expansions.join(","))
        };

        format!(
            "/api/v1/ExecuteMDXSetExpression?$expand=Tuples({top}$expand=Members($select={members}{expand}))"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_numeric_values_render_shortest() {
        assert_eq!(AttributeValue::from(5).to_string(), "5");
        assert_eq!(AttributeValue::from(2.5).to_string(), "2.5");
        assert_eq!(AttributeValue::from(-3_i64).to_string(), "-3");
    }

    #[test]
    fn test_filter_quotes_strings_only() {
        let text = filter_by_attribute_url("Region", "Region", "Currency", &"EUR".into());
        assert_eq!(
            text,
            "/api/v1/Dimensions('Region')/Hierarchies('Region')\
             ?$expand=Elements($filter = Attributes/Currency eq 'EUR';$select=Name)"
        );

        let number = filter_by_attribute_url("Region", "Region", "Population", &12.into());
        assert_eq!(
            number,
            "/api/v1/Dimensions('Region')/Hierarchies('Region')\
             ?$expand=Elements($filter = Attributes/Population eq 12;$select=Name)"
        );
    }

    #[test]
    fn test_filter_strips_spaces_and_escapes_value() {
        let url = filter_by_attribute_url("Product", "Product", "Long Name", &"Kid's Bike".into());
        assert!(url.contains("Attributes/LongName eq 'Kid%27%27s%20Bike'"));
    }

    #[test]
    fn test_consolidation_url_nesting() {
        assert_eq!(
            consolidation_url("Region", "Region", "World", 1),
            "/api/v1/Dimensions('Region')/Hierarchies('Region')/Elements('World')\
             ?$select=Name,Type&$expand=Components($select=Name,Type;$expand=Components)"
        );
        assert_eq!(
            consolidation_url("Region", "Region", "World", 2),
            "/api/v1/Dimensions('Region')/Hierarchies('Region')/Elements('World')\
             ?$select=Name,Type&$expand=Components($select=Name,Type;$expand=Components(\
             $select=Name,Type;$expand=Components))"
        );
    }

    #[test]
    fn test_consolidation_url_is_balanced() {
        let url = consolidation_url("Region", "Region", "World", DEFAULT_MAX_DEPTH);
        assert_eq!(url.matches('(').count(), url.matches(')').count());
        assert_eq!(url.matches("$expand=Components").count(), DEFAULT_MAX_DEPTH + 1);
    }

    #[test]
    fn test_set_mdx_default_projection() {
        assert_eq!(
            SetMdxQuery::default().url(),
            "/api/v1/ExecuteMDXSetExpression?$expand=Tuples($expand=Members(\
             $select=Name,Weight;$expand=Parent($select=Name,UniqueName),Element($select=Type,Level)))"
        );
    }

    #[test]
    fn test_set_mdx_without_expansions() {
        let url = SetMdxQuery::new()
            .with_top(10)
            .with_member_properties(&[])
            .with_parent_properties(&[])
            .with_element_properties(&[])
            .url();
        assert_eq!(
            url,
            "/api/v1/ExecuteMDXSetExpression?$expand=Tuples($top=10;$expand=Members($select=Name))"
        );
        assert!(!url.contains("Parent("));
        assert!(!url.contains("Element("));
    }

    #[test]
    fn test_set_mdx_zero_top_is_unbounded() {
        let url = SetMdxQuery::new().with_top(0).url();
        assert!(!url.contains("$top"));
    }

    #[test]
    fn test_set_mdx_single_expansion() {
        let url = SetMdxQuery::new()
            .with_parent_properties(&[])
            .with_element_properties(&["Name"])
            .url();
        assert!(url.ends_with(";$expand=Element($select=Name)))"));
        assert!(!url.contains("Parent("));
    }
}
