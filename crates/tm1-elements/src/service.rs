//! The element metadata client.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tm1_transport_traits::{RequestOptions, RestResponse, RestTransport};
use tracing::{debug, instrument};

use crate::collections::{CaseAndSpaceInsensitiveMap, CaseAndSpaceInsensitiveSet};
use crate::error::{ElementError, ElementResult};
use crate::mdx::{
    ElementSelection, all_elements_mdx, attribute_cube_name, attribute_cube_query,
    leaf_elements_mdx,
};
use crate::mdx_executor::{MdxExecutor, RestMdxExecutor, RowsAndValues};
use crate::objects::{ConsolidationNode, Element, ElementAttribute, ElementType};
use crate::query::{
    AttributeValue, DEFAULT_MAX_DEPTH, SetMdxQuery, consolidation_url, filter_by_attribute_url,
};
use crate::url::format_url;

const ELEMENT: &str = "/api/v1/Dimensions('{}')/Hierarchies('{}')/Elements('{}')";
const ELEMENTS: &str = "/api/v1/Dimensions('{}')/Hierarchies('{}')/Elements";
const ELEMENT_ATTRIBUTES: &str = "/api/v1/Dimensions('{}')/Hierarchies('{}')/ElementAttributes";
const LEVELS: &str = "/api/v1/Dimensions('{}')/Hierarchies('{}')/Levels";

#[derive(Debug, Deserialize)]
struct Named {
    #[serde(rename = "Name")]
    name: String,
}

#[derive(Debug, Deserialize)]
struct NamedWithType {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Type")]
    element_type: ElementType,
}

/// Removes `field` from a JSON object and decodes it.
fn decode_field<T: DeserializeOwned>(mut body: Value, field: &str, context: &str) -> ElementResult<T> {
    let value = body
        .get_mut(field)
        .map(Value::take)
        .ok_or_else(|| ElementError::missing_field(field, context))?;
    Ok(serde_json::from_value(value)?)
}

fn names(entries: Vec<Named>) -> Vec<String> {
    entries.into_iter().map(|entry| entry.name).collect()
}

/// Client for the elements, attributes and levels of TM1 hierarchies.
///
/// Every operation issues its requests through the injected
/// [`RestTransport`] and forwards `options` verbatim. The service holds no
/// mutable state; it is as safe to share as the transport is.
#[derive(Debug, Clone)]
pub struct ElementService {
    rest: Arc<dyn RestTransport>,
    mdx: Arc<dyn MdxExecutor>,
}

impl ElementService {
    /// Create a service over `rest`, running attribute queries with `mdx`.
    pub fn new(rest: Arc<dyn RestTransport>, mdx: Arc<dyn MdxExecutor>) -> Self {
        Self { rest, mdx }
    }

    /// Create a service whose attribute queries run through the
    /// `ExecuteMDX` action of the same transport.
    pub fn from_rest(rest: Arc<dyn RestTransport>) -> Self {
        let mdx = Arc::new(RestMdxExecutor::new(Arc::clone(&rest)));
        Self::new(rest, mdx)
    }

    async fn get_json(&self, url: &str, options: &RequestOptions) -> ElementResult<Value> {
        let response = self.rest.get(url, options).await?;
        Ok(response.json_value()?)
    }

    async fn get_count(&self, url: &str, options: &RequestOptions) -> ElementResult<usize> {
        let body = self.get_json(url, options).await?;
        decode_field(body, "@odata.count", "element count")
    }

    // ---- CRUD --------------------------------------------------------------

    /// Fetches one element with all its properties expanded.
    #[instrument(skip(self, options), level = "debug")]
    pub async fn get(
        &self,
        dimension: &str,
        hierarchy: &str,
        name: &str,
        options: &RequestOptions,
    ) -> ElementResult<Element> {
        let url = format_url(ELEMENT, &[dimension, hierarchy, name]) + "?$expand=*";
        let response = self.rest.get(&url, options).await?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    /// Creates `element` in the hierarchy.
    #[instrument(skip(self, element, options), fields(element = %element.name), level = "debug")]
    pub async fn create(
        &self,
        dimension: &str,
        hierarchy: &str,
        element: &Element,
        options: &RequestOptions,
    ) -> ElementResult<RestResponse> {
        let url = format_url(ELEMENTS, &[dimension, hierarchy]);
        Ok(self.rest.post(&url, element.body(), options).await?)
    }

    /// Updates the element named like `element`.
    #[instrument(skip(self, element, options), fields(element = %element.name), level = "debug")]
    pub async fn update(
        &self,
        dimension: &str,
        hierarchy: &str,
        element: &Element,
        options: &RequestOptions,
    ) -> ElementResult<RestResponse> {
        let url = format_url(ELEMENT, &[dimension, hierarchy, element.name.as_str()]);
        Ok(self.rest.patch(&url, element.body(), options).await?)
    }

    /// Deletes an element.
    #[instrument(skip(self, options), level = "debug")]
    pub async fn delete(
        &self,
        dimension: &str,
        hierarchy: &str,
        name: &str,
        options: &RequestOptions,
    ) -> ElementResult<RestResponse> {
        let url = format_url(ELEMENT, &[dimension, hierarchy, name]);
        Ok(self.rest.delete(&url, options).await?)
    }

    /// Returns whether the element exists.
    ///
    /// Any HTTP failure status reads as `false`; only failures that never
    /// reached the server are returned as errors.
    #[instrument(skip(self, options), level = "debug")]
    pub async fn exists(
        &self,
        dimension: &str,
        hierarchy: &str,
        name: &str,
        options: &RequestOptions,
    ) -> ElementResult<bool> {
        let url = format_url(ELEMENT, &[dimension, hierarchy, name]);
        Ok(self.rest.exists(&url, options).await?)
    }

    // ---- Listing -----------------------------------------------------------

    /// Fetches every element of the hierarchy with all properties expanded.
    #[instrument(skip(self, options), level = "debug")]
    pub async fn get_elements(
        &self,
        dimension: &str,
        hierarchy: &str,
        options: &RequestOptions,
    ) -> ElementResult<Vec<Element>> {
        let url = format_url(ELEMENTS, &[dimension, hierarchy]) + "?$expand=*";
        let elements: Vec<Element> =
            decode_field(self.get_json(&url, options).await?, "value", "element listing")?;
        debug!(count = elements.len(), "fetched elements");
        Ok(elements)
    }

    /// Fetches every numeric and string element of the hierarchy.
    #[instrument(skip(self, options), level = "debug")]
    pub async fn get_leaf_elements(
        &self,
        dimension: &str,
        hierarchy: &str,
        options: &RequestOptions,
    ) -> ElementResult<Vec<Element>> {
        let url = format_url(ELEMENTS, &[dimension, hierarchy]) + "?$expand=*&$filter=Type ne 3";
        let elements: Vec<Element> =
            decode_field(self.get_json(&url, options).await?, "value", "leaf element listing")?;
        debug!(count = elements.len(), "fetched leaf elements");
        Ok(elements)
    }

    /// Names of every element, in server order.
    #[instrument(skip(self, options), level = "debug")]
    pub async fn get_element_names(
        &self,
        dimension: &str,
        hierarchy: &str,
        options: &RequestOptions,
    ) -> ElementResult<Vec<String>> {
        let url = format_url(ELEMENTS, &[dimension, hierarchy]) + "?$select=Name";
        let entries: Vec<Named> =
            decode_field(self.get_json(&url, options).await?, "value", "element names")?;
        debug!(count = entries.len(), "fetched element names");
        Ok(names(entries))
    }

    /// Names of every numeric and string element, in server order.
    #[instrument(skip(self, options), level = "debug")]
    pub async fn get_leaf_element_names(
        &self,
        dimension: &str,
        hierarchy: &str,
        options: &RequestOptions,
    ) -> ElementResult<Vec<String>> {
        let url =
            format_url(ELEMENTS, &[dimension, hierarchy]) + "?$select=Name&$filter=Type ne 3";
        let entries: Vec<Named> =
            decode_field(self.get_json(&url, options).await?, "value", "leaf element names")?;
        debug!(count = entries.len(), "fetched leaf element names");
        Ok(names(entries))
    }

    /// Number of elements in the hierarchy.
    #[instrument(skip(self, options), level = "debug")]
    pub async fn get_number_of_elements(
        &self,
        dimension: &str,
        hierarchy: &str,
        options: &RequestOptions,
    ) -> ElementResult<usize> {
        let url = format_url(ELEMENTS, &[dimension, hierarchy]) + "?&$count&$top=0";
        self.get_count(&url, options).await
    }

    /// Number of consolidated elements in the hierarchy.
    #[instrument(skip(self, options), level = "debug")]
    pub async fn get_number_of_consolidated_elements(
        &self,
        dimension: &str,
        hierarchy: &str,
        options: &RequestOptions,
    ) -> ElementResult<usize> {
        let url =
            format_url(ELEMENTS, &[dimension, hierarchy]) + "?$filter=Type eq 3&$count&$top=0";
        self.get_count(&url, options).await
    }

    /// Number of numeric and string elements in the hierarchy.
    #[instrument(skip(self, options), level = "debug")]
    pub async fn get_number_of_leaf_elements(
        &self,
        dimension: &str,
        hierarchy: &str,
        options: &RequestOptions,
    ) -> ElementResult<usize> {
        let url =
            format_url(ELEMENTS, &[dimension, hierarchy]) + "?$filter=Type ne 3&$count&$top=0";
        self.get_count(&url, options).await
    }

    // ---- Attributes --------------------------------------------------------

    /// Attribute definitions of the hierarchy.
    #[instrument(skip(self, options), level = "debug")]
    pub async fn get_element_attributes(
        &self,
        dimension: &str,
        hierarchy: &str,
        options: &RequestOptions,
    ) -> ElementResult<Vec<ElementAttribute>> {
        let url = format_url(ELEMENT_ATTRIBUTES, &[dimension, hierarchy]);
        let attributes: Vec<ElementAttribute> =
            decode_field(self.get_json(&url, options).await?, "value", "element attributes")?;
        debug!(count = attributes.len(), "fetched element attributes");
        Ok(attributes)
    }

    /// Names of the alias attributes of the hierarchy.
    #[instrument(skip(self, options), level = "debug")]
    pub async fn get_alias_element_attributes(
        &self,
        dimension: &str,
        hierarchy: &str,
        options: &RequestOptions,
    ) -> ElementResult<Vec<String>> {
        let attributes = self.get_element_attributes(dimension, hierarchy, options).await?;
        Ok(attributes
            .into_iter()
            .filter(ElementAttribute::is_alias)
            .map(|attribute| attribute.name)
            .collect())
    }

    /// Creates an attribute definition on the hierarchy.
    #[instrument(skip(self, attribute, options), fields(attribute = %attribute.name), level = "debug")]
    pub async fn create_element_attribute(
        &self,
        dimension: &str,
        hierarchy: &str,
        attribute: &ElementAttribute,
        options: &RequestOptions,
    ) -> ElementResult<RestResponse> {
        let url = format_url(ELEMENT_ATTRIBUTES, &[dimension, hierarchy]);
        Ok(self.rest.post(&url, attribute.body(), options).await?)
    }

    /// Deletes an attribute definition.
    ///
    /// Attributes are elements of the `}ElementAttributes_` hierarchy that
    /// shadows the real one, so the attribute is removed from there.
    #[instrument(skip(self, options), level = "debug")]
    pub async fn delete_element_attribute(
        &self,
        dimension: &str,
        hierarchy: &str,
        attribute: &str,
        options: &RequestOptions,
    ) -> ElementResult<RestResponse> {
        let attribute_dimension = attribute_cube_name(dimension);
        let attribute_hierarchy = attribute_cube_name(hierarchy);
        let url = format_url(
            ELEMENT,
            &[
                attribute_dimension.as_str(),
                attribute_hierarchy.as_str(),
                attribute,
            ],
        );
        Ok(self.rest.delete(&url, options).await?)
    }

    /// Returns whether the attribute cube of `dimension` exists.
    #[instrument(skip(self, options), level = "debug")]
    pub async fn attribute_cube_exists(
        &self,
        dimension: &str,
        options: &RequestOptions,
    ) -> ElementResult<bool> {
        let cube = attribute_cube_name(dimension);
        let url = format_url("/api/v1/Cubes('{}')", &[cube.as_str()]);
        Ok(self.rest.exists(&url, options).await?)
    }

    /// Names of the elements whose `attribute` equals `value`.
    ///
    /// String values are compared as quoted literals, numeric values bare.
    #[instrument(skip(self, value, options), fields(value = %value), level = "debug")]
    pub async fn get_elements_filtered_by_attribute(
        &self,
        dimension: &str,
        hierarchy: &str,
        attribute: &str,
        value: &AttributeValue,
        options: &RequestOptions,
    ) -> ElementResult<Vec<String>> {
        let url = filter_by_attribute_url(dimension, hierarchy, attribute, value);
        let entries: Vec<Named> =
            decode_field(self.get_json(&url, options).await?, "Elements", "filtered elements")?;
        debug!(count = entries.len(), "fetched filtered elements");
        Ok(names(entries))
    }

    // ---- Identifiers (MDX) -------------------------------------------------

    /// Every name and alias value of the selected elements.
    ///
    /// Lets callers recognise an element by its name or by any of its
    /// aliases without knowing which one they hold.
    #[instrument(skip(self, elements, options), level = "debug")]
    pub async fn get_element_identifiers(
        &self,
        dimension: &str,
        hierarchy: &str,
        elements: impl Into<ElementSelection>,
        options: &RequestOptions,
    ) -> ElementResult<CaseAndSpaceInsensitiveSet> {
        let elements = elements.into();
        let aliases = self
            .get_alias_element_attributes(dimension, hierarchy, options)
            .await?;
        let mdx = attribute_cube_query(dimension, hierarchy, &elements, &aliases);
        let identifiers = self
            .mdx
            .execute_mdx_rows_and_values_string_set(&mdx, true, options)
            .await?;
        debug!(count = identifiers.len(), "collected element identifiers");
        Ok(identifiers)
    }

    /// Every name and alias value in the hierarchy.
    #[instrument(skip(self, options), level = "debug")]
    pub async fn get_all_element_identifiers(
        &self,
        dimension: &str,
        hierarchy: &str,
        options: &RequestOptions,
    ) -> ElementResult<CaseAndSpaceInsensitiveSet> {
        let mdx = all_elements_mdx(dimension, hierarchy);
        self.get_element_identifiers(dimension, hierarchy, mdx, options)
            .await
    }

    /// Every name and alias value of the level-0 elements.
    #[instrument(skip(self, options), level = "debug")]
    pub async fn get_all_leaf_element_identifiers(
        &self,
        dimension: &str,
        hierarchy: &str,
        options: &RequestOptions,
    ) -> ElementResult<CaseAndSpaceInsensitiveSet> {
        let mdx = leaf_elements_mdx(dimension, hierarchy);
        self.get_element_identifiers(dimension, hierarchy, mdx, options)
            .await
    }

    /// Value of `attribute` for each selected element, keyed by element name.
    ///
    /// An empty selection, such as `ElementSelection::default()`, queries
    /// every element of the hierarchy. Only string values are returned; empty strings
    /// are dropped when `exclude_empty_cells` is set.
    #[allow(clippy::too_many_arguments)]
    #[instrument(skip(self, elements, options), level = "debug")]
    pub async fn get_attribute_of_elements(
        &self,
        dimension: &str,
        hierarchy: &str,
        attribute: &str,
        elements: impl Into<ElementSelection>,
        exclude_empty_cells: bool,
        element_unique_names: bool,
        options: &RequestOptions,
    ) -> ElementResult<HashMap<String, String>> {
        let elements = match elements.into() {
            selection if !selection.is_empty() => selection,
            _ => ElementSelection::Names(
                self.get_element_names(dimension, hierarchy, options)
                    .await?,
            ),
        };
        let mdx = attribute_cube_query(dimension, hierarchy, &elements, &[attribute]);
        let rows = self
            .mdx
            .execute_mdx_rows_and_values(&mdx, element_unique_names, options)
            .await?;
        let values = extract_attribute_values(rows, exclude_empty_cells);
        debug!(count = values.len(), "collected attribute values");
        Ok(values)
    }

    // ---- Levels and types --------------------------------------------------

    /// Level names; `descending` reverses the order returned by the server.
    #[instrument(skip(self, options), level = "debug")]
    pub async fn get_level_names(
        &self,
        dimension: &str,
        hierarchy: &str,
        descending: bool,
        options: &RequestOptions,
    ) -> ElementResult<Vec<String>> {
        let url = format_url(LEVELS, &[dimension, hierarchy]) + "?$select=Name";
        let entries: Vec<Named> =
            decode_field(self.get_json(&url, options).await?, "value", "level names")?;
        let mut levels = names(entries);
        if descending {
            levels.reverse();
        }
        Ok(levels)
    }

    /// Number of levels in the hierarchy.
    #[instrument(skip(self, options), level = "debug")]
    pub async fn get_levels_count(
        &self,
        dimension: &str,
        hierarchy: &str,
        options: &RequestOptions,
    ) -> ElementResult<usize> {
        let url = format_url(LEVELS, &[dimension, hierarchy]) + "/$count";
        let response = self.rest.get(&url, options).await?;
        let text = response.text();
        text.trim().parse().map_err(|_| {
            ElementError::invalid_response(format!("level count is not a number: '{text}'"))
        })
    }

    /// Type of every element, keyed by name.
    #[instrument(skip(self, options), level = "debug")]
    pub async fn get_element_types(
        &self,
        dimension: &str,
        hierarchy: &str,
        skip_consolidations: bool,
        options: &RequestOptions,
    ) -> ElementResult<CaseAndSpaceInsensitiveMap<ElementType>> {
        let mut url = format_url(ELEMENTS, &[dimension, hierarchy]) + "?$select=Name,Type";
        if skip_consolidations {
            url.push_str("&$filter=Type ne 3");
        }
        let entries: Vec<NamedWithType> =
            decode_field(self.get_json(&url, options).await?, "value", "element types")?;
        Ok(entries
            .into_iter()
            .map(|entry| (entry.name, entry.element_type))
            .collect())
    }

    // ---- Hierarchy navigation ----------------------------------------------

    /// Names of the direct parents of an element.
    #[instrument(skip(self, options), level = "debug")]
    pub async fn get_parents(
        &self,
        dimension: &str,
        hierarchy: &str,
        element: &str,
        options: &RequestOptions,
    ) -> ElementResult<Vec<String>> {
        let url = format_url(ELEMENT, &[dimension, hierarchy, element]) + "/Parents?$select=Name";
        let entries: Vec<Named> =
            decode_field(self.get_json(&url, options).await?, "value", "element parents")?;
        Ok(names(entries))
    }

    /// Names of the direct components of a consolidation, in server order.
    #[instrument(skip(self, options), level = "debug")]
    pub async fn get_children(
        &self,
        dimension: &str,
        hierarchy: &str,
        consolidation: &str,
        options: &RequestOptions,
    ) -> ElementResult<Vec<String>> {
        let url = format_url(ELEMENT, &[dimension, hierarchy, consolidation])
            + "/Components?$select=Name";
        let entries: Vec<Named> =
            decode_field(self.get_json(&url, options).await?, "value", "element components")?;
        Ok(names(entries))
    }

    /// Members below a consolidation, depth first.
    ///
    /// The tree is expanded `max_depth` levels deep in a single request
    /// (`None` or `Some(0)` means 99). Members below that depth are not
    /// returned.
    #[instrument(skip(self, options), level = "debug")]
    pub async fn get_members_under_consolidation(
        &self,
        dimension: &str,
        hierarchy: &str,
        consolidation: &str,
        max_depth: Option<usize>,
        leaves_only: bool,
        options: &RequestOptions,
    ) -> ElementResult<Vec<String>> {
        let depth = match max_depth {
            Some(depth) if depth > 0 => depth,
            _ => DEFAULT_MAX_DEPTH,
        };
        let url = consolidation_url(dimension, hierarchy, consolidation, depth);
        let response = self.rest.get(&url, options).await?;
        // each tree level nests two JSON containers; the URL bounds the total
        let mut de = serde_json::Deserializer::from_slice(&response.body);
        de.disable_recursion_limit();
        let tree = ConsolidationNode::deserialize(&mut de)?;
        de.end()?;
        let members = tree.members(leaves_only);
        debug!(count = members.len(), depth, "walked consolidation");
        Ok(members)
    }

    /// Leaves below a consolidation, depth first.
    #[instrument(skip(self, options), level = "debug")]
    pub async fn get_leaves_under_consolidation(
        &self,
        dimension: &str,
        hierarchy: &str,
        consolidation: &str,
        max_depth: Option<usize>,
        options: &RequestOptions,
    ) -> ElementResult<Vec<String>> {
        self.get_members_under_consolidation(
            dimension,
            hierarchy,
            consolidation,
            max_depth,
            true,
            options,
        )
        .await
    }

    // ---- Set MDX -----------------------------------------------------------

    /// Evaluates an MDX set expression and returns the members of each
    /// tuple as sent by the server.
    #[instrument(skip(self, options), level = "debug")]
    pub async fn execute_set_mdx(
        &self,
        mdx: &str,
        query: &SetMdxQuery,
        options: &RequestOptions,
    ) -> ElementResult<Vec<Vec<Value>>> {
        let body = serde_json::json!({ "MDX": mdx }).to_string();
        let response = self.rest.post(&query.url(), body, options).await?;
        let tuples: Vec<Value> = decode_field(response.json_value()?, "Tuples", "MDX set result")?;
        let members = tuples
            .into_iter()
            .map(|tuple| decode_field(tuple, "Members", "MDX set tuple"))
            .collect::<ElementResult<Vec<Vec<Value>>>>()?;
        debug!(tuples = members.len(), "executed set MDX");
        Ok(members)
    }
}

/// Folds rows and values into `element -> value`.
///
/// Each member of a row tuple is mapped to each string value of the row.
/// Later rows overwrite earlier ones.
fn extract_attribute_values(
    rows: RowsAndValues,
    exclude_empty_cells: bool,
) -> HashMap<String, String> {
    let mut values = HashMap::new();
    for (members, cells) in rows {
        for member in &members {
            for cell in &cells {
                if let Value::String(text) = cell
                    && (!text.is_empty() || !exclude_empty_cells)
                {
                    values.insert(member.clone(), text.clone());
                }
            }
        }
    }
    values
}
