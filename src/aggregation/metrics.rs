//! Per-bucket metrics

use std::collections::BTreeSet;

use serde_json::Value as JsonValue;

use crate::query::{QueryError, QueryResult};
use crate::value::{resolve_path, Value};

/// A supported metric
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Metric {
    /// Number of distinct values of a field
    Cardinality { field: String },
}

impl Metric {
    /// Parses a single-key `{metric_type: {"field": f}}` mapping
    pub fn parse(definition: &JsonValue) -> QueryResult<Self> {
        let map = definition.as_object().ok_or_else(|| {
            QueryError::validation(format!("metric definition must be an object, got {}", definition))
        })?;
        let Some((kind, body)) = map.iter().next() else {
            return Err(QueryError::validation("empty metric definition"));
        };

        match kind.as_str() {
            "cardinality" => {
                let field = body
                    .get("field")
                    .and_then(JsonValue::as_str)
                    .ok_or_else(|| QueryError::validation("cardinality requires a 'field'"))?;
                Ok(Metric::Cardinality {
                    field: field.to_string(),
                })
            }
            other => Err(QueryError::not_implemented(format!(
                "Metric type '{}' not implemented",
                other
            ))),
        }
    }

    /// Computes the metric over the documents of one bucket
    pub fn compute(&self, documents: &[&Value]) -> Value {
        match self {
            Metric::Cardinality { field } => {
                let mut distinct = BTreeSet::new();
                for source in documents {
                    let Some(found) = resolve_path(source, field) else {
                        continue;
                    };
                    match found.into_owned() {
                        Value::Null => {}
                        Value::Array(items) => {
                            distinct.extend(items.into_iter().filter(|item| !item.is_null()))
                        }
                        value => {
                            distinct.insert(value);
                        }
                    }
                }
                Value::from(distinct.len())
            }
        }
    }
}

/// A named metric attached to a composite aggregation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSpec {
    pub name: String,
    pub metric: Metric,
}
