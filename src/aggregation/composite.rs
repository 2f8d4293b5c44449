//! Composite bucketing
//!
//! Documents are grouped by the tuple of their source-field values. Buckets
//! come out in ascending key order, which is also the pagination order.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value as JsonValue;

use super::metrics::MetricSpec;
use super::AggregationSpec;
use crate::query::QueryResult;
use crate::value::{resolve_path, Value};

/// One `terms` source of a composite aggregation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeSource {
    /// Key name in the bucket key object
    pub name: String,
    /// Document field the values come from
    pub field: String,
}

/// A parsed composite aggregation
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeAggregation {
    pub sources: Vec<CompositeSource>,
    pub size: usize,
    pub after: Option<BTreeMap<String, Value>>,
    pub metrics: Vec<MetricSpec>,
}

/// A group of documents sharing one composite key
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    /// Source name and value, in declared source order
    pub key: Vec<(String, Value)>,
    pub doc_count: usize,
    /// Metric name and value, in declared metric order
    pub metrics: Vec<(String, Value)>,
}

impl Bucket {
    /// The key as an object keyed by source name
    pub fn key_object(&self) -> BTreeMap<String, Value> {
        self.key.iter().cloned().collect()
    }

    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or(JsonValue::Null)
    }
}

impl Serialize for Bucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2 + self.metrics.len()))?;
        map.serialize_entry("key", &self.key_object())?;
        map.serialize_entry("doc_count", &self.doc_count)?;
        for (name, value) in &self.metrics {
            map.serialize_entry(name, &BTreeMap::from([("value", value)]))?;
        }
        map.end()
    }
}

/// One page of composite buckets
#[derive(Debug, Clone, PartialEq)]
pub struct CompositePage {
    pub buckets: Vec<Bucket>,
    /// Key of the last returned bucket
    pub after_key: Option<BTreeMap<String, Value>>,
}

impl CompositeAggregation {
    /// Groups documents into ordered buckets and computes their metrics.
    ///
    /// Documents missing any source field are skipped. A list value puts the
    /// document into one bucket per element.
    pub fn bucket<'a, I>(&self, documents: I) -> Vec<Bucket>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let mut groups: BTreeMap<Vec<Value>, Vec<&'a Value>> = BTreeMap::new();

        for source in documents {
            for key in self.keys_of(source) {
                groups.entry(key).or_default().push(source);
            }
        }

        groups
            .into_iter()
            .map(|(key, members)| Bucket {
                key: self
                    .sources
                    .iter()
                    .map(|s| s.name.clone())
                    .zip(key)
                    .collect(),
                doc_count: members.len(),
                metrics: self
                    .metrics
                    .iter()
                    .map(|spec| (spec.name.clone(), spec.metric.compute(&members)))
                    .collect(),
            })
            .collect()
    }

    fn keys_of(&self, source: &Value) -> Vec<Vec<Value>> {
        let mut keys: Vec<Vec<Value>> = vec![Vec::with_capacity(self.sources.len())];

        for composite_source in &self.sources {
            let values = match resolve_path(source, &composite_source.field) {
                None => return Vec::new(),
                Some(found) => match found.into_owned() {
                    Value::Array(items) => items,
                    value => vec![value],
                },
            };
            if values.is_empty() {
                return Vec::new();
            }

            keys = keys
                .into_iter()
                .flat_map(|prefix| {
                    values.iter().map(move |value| {
                        let mut key = prefix.clone();
                        key.push(value.clone());
                        key
                    })
                })
                .collect();
        }

        keys
    }

    /// Applies `after` and `size` to ordered buckets
    pub fn page(&self, buckets: Vec<Bucket>) -> CompositePage {
        let after: Option<Vec<Value>> = self.after.as_ref().map(|after| {
            self.sources
                .iter()
                .map(|s| after.get(&s.name).cloned().unwrap_or_default())
                .collect()
        });

        let buckets: Vec<Bucket> = buckets
            .into_iter()
            .filter(|bucket| match &after {
                Some(after) => {
                    let key: Vec<&Value> = bucket.key.iter().map(|(_, v)| v).collect();
                    key.into_iter().cmp(after.iter()) == std::cmp::Ordering::Greater
                }
                None => true,
            })
            .take(self.size)
            .collect();

        let after_key = buckets.last().map(Bucket::key_object);
        CompositePage { buckets, after_key }
    }
}

/// Builds ordered buckets for an aggregation.
///
/// Anything other than a composite aggregation yields no buckets.
pub fn build_buckets<'a, I>(spec: &AggregationSpec, documents: I) -> QueryResult<Vec<Bucket>>
where
    I: IntoIterator<Item = &'a Value>,
{
    match spec {
        AggregationSpec::Composite(composite) => Ok(composite.bucket(documents)),
        AggregationSpec::Unsupported(_) => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec(definition: JsonValue) -> AggregationSpec {
        AggregationSpec::parse(&definition).unwrap()
    }

    fn docs(items: &[JsonValue]) -> Vec<Value> {
        items.iter().map(Value::from).collect()
    }

    #[test]
    fn test_buckets_are_ordered_by_key() {
        let spec = spec(json!({
            "composite": {"sources": [{"x": {"terms": {"field": "data_x"}}}]}
        }));
        let documents = docs(&[json!({"data_x": 3}), json!({"data_x": 1}), json!({"data_x": 2})]);

        let buckets = build_buckets(&spec, &documents).unwrap();
        let keys: Vec<Value> = buckets.iter().map(|b| b.key[0].1.clone()).collect();
        assert_eq!(keys, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    }

    #[test]
    fn test_bucket_rendering() {
        let spec = spec(json!({
            "composite": {"sources": [{"x": {"terms": {"field": "data_x"}}}]},
            "aggs": {"users": {"cardinality": {"field": "user"}}}
        }));
        let documents = docs(&[
            json!({"data_x": 1, "user": "a"}),
            json!({"data_x": 1, "user": "b"}),
            json!({"data_x": 1, "user": "a"}),
        ]);

        let buckets = build_buckets(&spec, &documents).unwrap();
        assert_eq!(
            buckets[0].to_json(),
            json!({"key": {"x": 1}, "doc_count": 3, "users": {"value": 2}})
        );
    }

    #[test]
    fn test_missing_fields_are_skipped() {
        let spec = spec(json!({
            "composite": {"sources": [
                {"a": {"terms": {"field": "a"}}},
                {"b": {"terms": {"field": "b"}}}
            ]}
        }));
        let documents = docs(&[json!({"a": 1, "b": 2}), json!({"a": 1})]);

        let buckets = build_buckets(&spec, &documents).unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].doc_count, 1);
    }

    #[test]
    fn test_list_values_fan_out() {
        let spec = spec(json!({
            "composite": {"sources": [{"tag": {"terms": {"field": "tags"}}}]}
        }));
        let documents = docs(&[json!({"tags": ["b", "a"]}), json!({"tags": ["a"]})]);

        let buckets = build_buckets(&spec, &documents).unwrap();
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].key_object()["tag"], Value::from("a"));
        assert_eq!(buckets[0].doc_count, 2);
        assert_eq!(buckets[1].doc_count, 1);
    }

    #[test]
    fn test_unsupported_shape_yields_no_buckets() {
        let spec = spec(json!({"terms": {"field": "a"}}));
        let documents = docs(&[json!({"a": 1})]);
        assert!(build_buckets(&spec, &documents).unwrap().is_empty());
    }

    #[test]
    fn test_page_after_and_size() {
        let AggregationSpec::Composite(composite) = spec(json!({
            "composite": {
                "size": 2,
                "after": {"x": 1},
                "sources": [{"x": {"terms": {"field": "x"}}}]
            }
        })) else {
            panic!("expected composite");
        };
        let documents = docs(&[json!({"x": 1}), json!({"x": 2}), json!({"x": 3}), json!({"x": 4})]);

        let page = composite.page(composite.bucket(&documents));
        let keys: Vec<Value> = page.buckets.iter().map(|b| b.key[0].1.clone()).collect();
        assert_eq!(keys, vec![Value::Int(2), Value::Int(3)]);
        assert_eq!(page.after_key.unwrap()["x"], Value::Int(3));
    }
}
