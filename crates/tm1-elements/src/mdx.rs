//! MDX text builders.
//!
//! Identifiers are wrapped in brackets but not otherwise escaped; names
//! containing `]` must be escaped by the caller.

/// Prefix of the cube, dimension and hierarchy holding element attributes.
pub const ELEMENT_ATTRIBUTES_PREFIX: &str = "}ElementAttributes_";

/// A set of elements, given either as MDX or as a list of names.
///
/// The default is an empty name list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementSelection {
    /// An MDX set expression, used verbatim
    Mdx(String),
    /// Element names, qualified with the dimension and hierarchy
    Names(Vec<String>),
}

impl ElementSelection {
    /// Renders the comma-separated member list placed inside `{ ... }`.
    pub fn to_mdx(&self, dimension: &str, hierarchy: &str) -> String {
        match self {
            Self::Mdx(mdx) => mdx.clone(),
            Self::Names(names) => names
                .iter()
                .map(|name| build_element_unique_name(dimension, hierarchy, name))
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Returns `true` for an empty expression or an empty name list.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Mdx(mdx) => mdx.trim().is_empty(),
            Self::Names(names) => names.is_empty(),
        }
    }
}

impl Default for ElementSelection {
    fn default() -> Self {
        Self::Names(Vec::new())
    }
}

impl From<&str> for ElementSelection {
    fn from(mdx: &str) -> Self {
        Self::Mdx(mdx.to_string())
    }
}

impl From<String> for ElementSelection {
    fn from(mdx: String) -> Self {
        Self::Mdx(mdx)
    }
}

impl From<Vec<String>> for ElementSelection {
    fn from(names: Vec<String>) -> Self {
        Self::Names(names)
    }
}

impl From<&[&str]> for ElementSelection {
    fn from(names: &[&str]) -> Self {
        Self::Names(names.iter().map(|n| (*n).to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ElementSelection {
    fn from(names: [&str; N]) -> Self {
        Self::Names(names.iter().map(|n| (*n).to_string()).collect())
    }
}

/// `[dimension].[hierarchy].[element]`
pub fn build_element_unique_name(dimension: &str, hierarchy: &str, element: &str) -> String {
    format!("[{dimension}].[{hierarchy}].[{element}]")
}

/// `[}ElementAttributes_dimension].[attribute]`
pub fn build_attribute_unique_name(dimension: &str, attribute: &str) -> String {
    format!("[{ELEMENT_ATTRIBUTES_PREFIX}{dimension}].[{attribute}]")
}

/// Name of the cube holding the attribute values of `dimension`.
pub fn attribute_cube_name(dimension: &str) -> String {
    format!("{ELEMENT_ATTRIBUTES_PREFIX}{dimension}")
}

/// Every element of a hierarchy.
pub fn all_elements_mdx(dimension: &str, hierarchy: &str) -> String {
    format!("{{ Tm1SubsetAll ([{dimension}].[{hierarchy}]) }}")
}

/// The level-0 elements of a hierarchy.
pub fn leaf_elements_mdx(dimension: &str, hierarchy: &str) -> String {
    format!("{{ Tm1FilterByLevel ( {{ Tm1SubsetAll ([{dimension}].[{hierarchy}]) }} , 0 ) }}")
}

/// Queries the attribute cube of `dimension`: the selected elements on rows,
/// the given attributes on columns.
pub fn attribute_cube_query<S: AsRef<str>>(
    dimension: &str,
    hierarchy: &str,
    elements: &ElementSelection,
    attributes: &[S],
) -> String {
    let columns = attributes
        .iter()
        .map(|attribute| build_attribute_unique_name(dimension, attribute.as_ref()))
        .collect::<Vec<_>>()
        .join(",");

    format!(
        "SELECT\n{{ {rows} }} ON ROWS,\n{{ {columns} }} ON COLUMNS\nFROM [{cube}]",
        rows = elements.to_mdx(dimension, hierarchy),
        cube = attribute_cube_name(dimension),
    )
}
