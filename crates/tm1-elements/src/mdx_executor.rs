//! Execution of MDX queries.
//!
//! [`ElementService`](crate::ElementService) needs cell values only for the
//! attribute queries; it reaches them through [`MdxExecutor`] so a different
//! cell engine can be supplied in place of [`RestMdxExecutor`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tm1_transport_traits::{RequestOptions, RestTransport};
use tracing::{debug, instrument};

use crate::collections::{CaseAndSpaceInsensitiveSet, CaseAndSpaceInsensitiveTuplesMap};
use crate::error::ElementResult;

/// Row tuples of an MDX result, each mapped to its cell values across the
/// columns.
pub type RowsAndValues = CaseAndSpaceInsensitiveTuplesMap<Vec<Value>>;

const EXECUTE_MDX_URL: &str = "/api/v1/ExecuteMDX?$expand=\
     Axes($expand=Tuples($expand=Members($select=Name,UniqueName))),\
     Cells($select=Ordinal,Value)";

/// Runs MDX queries and returns their cells keyed by row.
#[async_trait]
pub trait MdxExecutor: Send + Sync + std::fmt::Debug {
    /// Executes `mdx` and returns, for every row tuple, the cell values of
    /// that row in column order.
    ///
    /// Row tuples hold member names, or unique names when
    /// `element_unique_names` is set.
    async fn execute_mdx_rows_and_values(
        &self,
        mdx: &str,
        element_unique_names: bool,
        options: &RequestOptions,
    ) -> ElementResult<RowsAndValues>;

    /// Executes `mdx` and collects every row member name and every string
    /// cell value into one set.
    ///
    /// Empty strings are skipped when `exclude_empty_cells` is set. Non-string
    /// cells are always skipped.
    async fn execute_mdx_rows_and_values_string_set(
        &self,
        mdx: &str,
        exclude_empty_cells: bool,
        options: &RequestOptions,
    ) -> ElementResult<CaseAndSpaceInsensitiveSet> {
        let rows = self.execute_mdx_rows_and_values(mdx, false, options).await?;
        Ok(string_set(&rows, exclude_empty_cells))
    }
}

/// Flattens rows and values into the set of names and string values.
pub(crate) fn string_set(rows: &RowsAndValues, exclude_empty_cells: bool) -> CaseAndSpaceInsensitiveSet {
    let mut set = CaseAndSpaceInsensitiveSet::new();
    for (members, values) in rows.iter() {
        set.extend(members.iter().cloned());
        for value in values {
            if let Value::String(text) = value
                && (!text.is_empty() || !exclude_empty_cells)
            {
                set.insert(text.clone());
            }
        }
    }
    set
}

/// [`MdxExecutor`] that runs queries through the `ExecuteMDX` action.
#[derive(Debug, Clone)]
pub struct RestMdxExecutor {
    rest: Arc<dyn RestTransport>,
}

impl RestMdxExecutor {
    /// Create an executor over `rest`.
    pub fn new(rest: Arc<dyn RestTransport>) -> Self {
        Self { rest }
    }
}

#[async_trait]
impl MdxExecutor for RestMdxExecutor {
    #[instrument(skip(self, mdx, options), level = "debug")]
    async fn execute_mdx_rows_and_values(
        &self,
        mdx: &str,
        element_unique_names: bool,
        options: &RequestOptions,
    ) -> ElementResult<RowsAndValues> {
        let body = serde_json::json!({ "MDX": mdx }).to_string();
        let response = self.rest.post(EXECUTE_MDX_URL, body, options).await?;
        let cellset: Cellset = serde_json::from_slice(&response.body)?;
        let rows = cellset.into_rows_and_values(element_unique_names);
        debug!(rows = rows.len(), "executed MDX");
        Ok(rows)
    }
}

#[derive(Debug, Deserialize)]
struct Cellset {
    #[serde(rename = "Axes", default)]
    axes: Vec<Axis>,
    #[serde(rename = "Cells", default)]
    cells: Vec<Cell>,
}

#[derive(Debug, Deserialize)]
struct Axis {
    #[serde(rename = "Ordinal", default)]
    ordinal: Option<usize>,
    #[serde(rename = "Tuples", default)]
    tuples: Vec<AxisTuple>,
}

#[derive(Debug, Deserialize)]
struct AxisTuple {
    #[serde(rename = "Members", default)]
    members: Vec<AxisMember>,
}

#[derive(Debug, Deserialize)]
struct AxisMember {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "UniqueName", default)]
    unique_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Cell {
    #[serde(rename = "Ordinal")]
    ordinal: usize,
    #[serde(rename = "Value", default)]
    value: Value,
}

impl Cellset {
    fn axis(&self, ordinal: usize) -> Option<&Axis> {
        self.axes
            .iter()
            .find(|axis| axis.ordinal == Some(ordinal))
            .or_else(|| {
                self.axes
                    .get(ordinal)
                    .filter(|axis| axis.ordinal.is_none())
            })
    }

    /// Axis 0 holds the columns and axis 1 the rows. The cell of row `r`,
    /// column `c` has ordinal `r * columns + c`.
    fn into_rows_and_values(self, element_unique_names: bool) -> RowsAndValues {
        let columns = self.axis(0).map_or(1, |axis| axis.tuples.len());
        let row_keys: Vec<Vec<String>> = match self.axis(1) {
            Some(axis) => axis
                .tuples
                .iter()
                .map(|tuple| {
                    tuple
                        .members
                        .iter()
                        .map(|member| match (&member.unique_name, element_unique_names) {
                            (Some(unique), true) => unique.clone(),
                            _ => member.name.clone(),
                        })
                        .collect()
                })
                .collect(),
            None => vec![Vec::new()],
        };

        let mut cells: HashMap<usize, Value> = self
            .cells
            .into_iter()
            .map(|cell| (cell.ordinal, cell.value))
            .collect();

        let mut rows = RowsAndValues::new();
        for (r, key) in row_keys.into_iter().enumerate() {
            let values = (0..columns)
                .map(|c| cells.remove(&(r * columns + c)).unwrap_or(Value::Null))
                .collect();
            rows.insert(key, values);
        }
        rows
    }
}
