//! Command execution against an `ElementService`

use tm1_elements::{AttributeValue, ElementSelection, ElementService, SetMdxQuery};
use tm1_transport_traits::RequestOptions;
use tracing::debug;

use crate::cli::{Commands, CountKind, OutputFormat};
use crate::error::{CliError, CliResult};
use crate::formatter::Formatter;
use crate::output::Output;

/// Execute CLI commands
pub struct CommandExecutor {
    pub formatter: Formatter,
    options: RequestOptions,
}

impl CommandExecutor {
    #[must_use]
    pub fn new(format: OutputFormat, colored: bool) -> Self {
        Self {
            formatter: Formatter::new(format, colored),
            options: RequestOptions::default(),
        }
    }

    /// Display an error with rich formatting
    pub fn display_error(&self, error: &CliError) {
        self.formatter.display_error(error);
    }

    /// Run a command and return its result
    pub async fn execute(&self, service: &ElementService, command: Commands) -> CliResult<Output> {
        let options = &self.options;
        debug!(?command, "executing");

        let output = match command {
            Commands::Elements { target, leaves } => {
                let (dimension, hierarchy) = (&target.dimension, target.hierarchy());
                let names = if leaves {
                    service
                        .get_leaf_element_names(dimension, hierarchy, options)
                        .await?
                } else {
                    service.get_element_names(dimension, hierarchy, options).await?
                };
                Output::Names {
                    title: if leaves { "Leaf elements" } else { "Elements" }.to_string(),
                    names,
                }
            }

            Commands::Count { target, kind } => {
                let (dimension, hierarchy) = (&target.dimension, target.hierarchy());
                let (label, count) = match kind {
                    CountKind::All => (
                        "Elements",
                        service
                            .get_number_of_elements(dimension, hierarchy, options)
                            .await?,
                    ),
                    CountKind::Leaves => (
                        "Leaf elements",
                        service
                            .get_number_of_leaf_elements(dimension, hierarchy, options)
                            .await?,
                    ),
                    CountKind::Consolidated => (
                        "Consolidated elements",
                        service
                            .get_number_of_consolidated_elements(dimension, hierarchy, options)
                            .await?,
                    ),
                };
                Output::Count {
                    label: label.to_string(),
                    count,
                }
            }

            Commands::Types {
                target,
                skip_consolidations,
            } => {
                let types = service
                    .get_element_types(
                        &target.dimension,
                        target.hierarchy(),
                        skip_consolidations,
                        options,
                    )
                    .await?;
                Output::Pairs {
                    title: "Element types".to_string(),
                    headers: ["Element", "Type"],
                    pairs: types
                        .into_iter()
                        .map(|(name, element_type)| (name, element_type.to_string()))
                        .collect(),
                }
            }

            Commands::Levels { target, ascending } => {
                let names = service
                    .get_level_names(&target.dimension, target.hierarchy(), !ascending, options)
                    .await?;
                Output::Names {
                    title: "Levels".to_string(),
                    names,
                }
            }

            Commands::Attributes { target, aliases } => {
                let (dimension, hierarchy) = (&target.dimension, target.hierarchy());
                if aliases {
                    Output::Names {
                        title: "Alias attributes".to_string(),
                        names: service
                            .get_alias_element_attributes(dimension, hierarchy, options)
                            .await?,
                    }
                } else {
                    let attributes = service
                        .get_element_attributes(dimension, hierarchy, options)
                        .await?;
                    Output::Pairs {
                        title: "Attributes".to_string(),
                        headers: ["Attribute", "Type"],
                        pairs: attributes
                            .into_iter()
                            .map(|attribute| (attribute.name, attribute.attribute_type.to_string()))
                            .collect(),
                    }
                }
            }

            Commands::Attribute {
                target,
                attribute,
                elements,
                mdx,
                include_empty,
            } => {
                let selection = match mdx {
                    Some(mdx) => ElementSelection::Mdx(mdx),
                    None => ElementSelection::Names(elements),
                };
                let values = service
                    .get_attribute_of_elements(
                        &target.dimension,
                        target.hierarchy(),
                        &attribute,
                        selection,
                        !include_empty,
                        false,
                        options,
                    )
                    .await?;
                let mut pairs: Vec<_> = values.into_iter().collect();
                pairs.sort();
                Output::Pairs {
                    title: attribute,
                    headers: ["Element", "Value"],
                    pairs,
                }
            }

            Commands::Members {
                target,
                consolidation,
                leaves,
                max_depth,
            } => {
                let names = service
                    .get_members_under_consolidation(
                        &target.dimension,
                        target.hierarchy(),
                        &consolidation,
                        max_depth,
                        leaves,
                        options,
                    )
                    .await?;
                Output::Names {
                    title: format!("Members of {consolidation}"),
                    names,
                }
            }

            Commands::Filter {
                target,
                attribute,
                value,
                numeric,
            } => {
                let value = if numeric {
                    let number = value
                        .trim()
                        .parse::<f64>()
                        .ok()
                        .filter(|number| number.is_finite())
                        .ok_or_else(|| {
                            CliError::InvalidArguments(format!("'{value}' is not a finite number"))
                        })?;
                    AttributeValue::Numeric(number)
                } else {
                    AttributeValue::String(value)
                };
                let names = service
                    .get_elements_filtered_by_attribute(
                        &target.dimension,
                        target.hierarchy(),
                        &attribute,
                        &value,
                        options,
                    )
                    .await?;
                Output::Names {
                    title: format!("Elements with {attribute} = {value}"),
                    names,
                }
            }

            Commands::Exists { target, element } => {
                let exists = service
                    .exists(&target.dimension, target.hierarchy(), &element, options)
                    .await?;
                Output::Flag {
                    label: format!("{element} exists"),
                    value: exists,
                }
            }

            Commands::SetMdx { mdx, top } => {
                let query = match top {
                    Some(top) => SetMdxQuery::new().with_top(top),
                    None => SetMdxQuery::new(),
                };
                Output::Tuples(service.execute_set_mdx(&mdx, &query, options).await?)
            }
        };

        Ok(output)
    }
}
