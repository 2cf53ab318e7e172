//! Command results, independent of how they are rendered

use serde_json::{Map, Value};

/// What a command produced
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// Ordered names, one per line
    Names { title: String, names: Vec<String> },
    /// A single count
    Count { label: String, count: usize },
    /// A yes/no answer
    Flag { label: String, value: bool },
    /// Ordered key/value pairs
    Pairs {
        title: String,
        headers: [&'static str; 2],
        pairs: Vec<(String, String)>,
    },
    /// Tuples of an MDX set, each a list of member objects
    Tuples(Vec<Vec<Value>>),
}

impl Output {
    /// JSON rendering: arrays for names and tuples, an object for pairs and
    /// bare scalars for counts and flags
    pub fn to_json(&self) -> Value {
        match self {
            Self::Names { names, .. } => Value::from(names.clone()),
            Self::Count { count, .. } => Value::from(*count),
            Self::Flag { value, .. } => Value::Bool(*value),
            Self::Pairs { pairs, .. } => Value::Object(
                pairs
                    .iter()
                    .map(|(key, value)| (key.clone(), Value::String(value.clone())))
                    .collect::<Map<_, _>>(),
            ),
            Self::Tuples(tuples) => Value::from(
                tuples
                    .iter()
                    .map(|members| Value::Array(members.clone()))
                    .collect::<Vec<_>>(),
            ),
        }
    }
}
