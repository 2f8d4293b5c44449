//! Aggregation engine
//!
//! Only composite aggregations produce buckets. A composite definition has
//! `composite.sources` (single-key `name: {"terms": {"field": f}}` entries),
//! optional `size` and `after`, and named metrics under `aggs`.

mod composite;
mod metrics;

pub use composite::{build_buckets, Bucket, CompositeAggregation, CompositePage, CompositeSource};
pub use metrics::{Metric, MetricSpec};

use serde_json::Value as JsonValue;

use crate::query::{QueryError, QueryResult};
use crate::value::Value;

/// Page size when a composite aggregation does not set one
pub const DEFAULT_COMPOSITE_SIZE: usize = 10;

/// A parsed aggregation definition
#[derive(Debug, Clone, PartialEq)]
pub enum AggregationSpec {
    Composite(CompositeAggregation),
    /// Any other aggregation shape, by its first key
    Unsupported(String),
}

impl AggregationSpec {
    /// Parses one named aggregation definition
    pub fn parse(definition: &JsonValue) -> QueryResult<Self> {
        let map = definition.as_object().ok_or_else(|| {
            QueryError::validation(format!("aggregation must be an object, got {}", definition))
        })?;

        let Some(composite) = map.get("composite") else {
            let kind = map.keys().next().cloned().unwrap_or_default();
            return Ok(AggregationSpec::Unsupported(kind));
        };

        let sources = composite
            .get("sources")
            .and_then(JsonValue::as_array)
            .ok_or_else(|| QueryError::validation("composite aggregation requires 'sources'"))?
            .iter()
            .map(parse_source)
            .collect::<QueryResult<Vec<_>>>()?;

        let size = match composite.get("size") {
            None => DEFAULT_COMPOSITE_SIZE,
            Some(size) => size.as_u64().ok_or_else(|| {
                QueryError::validation(format!("composite size must be a positive integer, got {}", size))
            })? as usize,
        };

        let after = match composite.get("after") {
            None => None,
            Some(JsonValue::Object(after)) => Some(
                after
                    .iter()
                    .map(|(name, value)| (name.clone(), Value::from(value)))
                    .collect(),
            ),
            Some(other) => {
                return Err(QueryError::validation(format!(
                    "composite 'after' must be an object, got {}",
                    other
                )))
            }
        };

        let mut metrics = Vec::new();
        if let Some(named) = map.get("aggs").or_else(|| map.get("aggregations")) {
            let named = named.as_object().ok_or_else(|| {
                QueryError::validation("composite sub-aggregations must be an object")
            })?;
            for (name, definition) in named {
                metrics.push(MetricSpec {
                    name: name.clone(),
                    metric: Metric::parse(definition)?,
                });
            }
        }

        Ok(AggregationSpec::Composite(CompositeAggregation {
            sources,
            size,
            after,
            metrics,
        }))
    }
}

fn parse_source(entry: &JsonValue) -> QueryResult<CompositeSource> {
    let invalid = || QueryError::validation(format!("invalid composite source {}", entry));

    let map = entry.as_object().ok_or_else(invalid)?;
    let (name, body) = map.iter().next().ok_or_else(invalid)?;
    let body = body.as_object().ok_or_else(invalid)?;
    let (kind, settings) = body.iter().next().ok_or_else(invalid)?;

    if kind != "terms" {
        return Err(QueryError::not_implemented(format!(
            "Composite source type '{}' not implemented",
            kind
        )));
    }

    let field = settings
        .get("field")
        .and_then(JsonValue::as_str)
        .ok_or_else(invalid)?;

    Ok(CompositeSource {
        name: name.clone(),
        field: field.to_string(),
    })
}
