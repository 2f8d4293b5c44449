//! Stored documents

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::value::Value;

/// Type tag given to every document
pub const DEFAULT_DOC_TYPE: &str = "_doc";

/// A document held by the store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_type")]
    pub doc_type: String,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_version")]
    pub version: u64,
    #[serde(rename = "_source")]
    pub source: Value,
}

impl Document {
    /// A first version of a document
    pub fn new(index: impl Into<String>, id: impl Into<String>, source: Value) -> Self {
        Self {
            index: index.into(),
            doc_type: DEFAULT_DOC_TYPE.to_string(),
            id: id.into(),
            version: 1,
            source,
        }
    }

    pub fn with_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = doc_type.into();
        self
    }
}

/// Reads a document id from a JSON scalar
pub fn id_from_json(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(id) => Some(id.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Shallow-merges the members of `patch` into `target`.
///
/// A non-object target is replaced by the patch.
pub fn merge_source(target: &mut Value, patch: Value) {
    match (target.as_object_mut(), patch) {
        (Some(existing), Value::Object(members)) => existing.extend(members),
        (_, patch) => *target = patch,
    }
}
