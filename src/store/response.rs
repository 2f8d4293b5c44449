//! Response bodies
//!
//! Field names follow the wire protocol; everything serializes with serde.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value as JsonValue;

use super::document::Document;
use crate::aggregation::Bucket;
use crate::value::Value;

/// Shard summary; every index is simulated as a single shard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Shards {
    pub total: usize,
    pub successful: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl Shards {
    pub fn of(indices: usize) -> Self {
        Self {
            total: indices,
            successful: indices,
            skipped: 0,
            failed: 0,
        }
    }
}

/// Answer to `create` and `index`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WriteResponse {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_type")]
    pub doc_type: String,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_version")]
    pub version: u64,
    pub result: String,
    pub created: bool,
    #[serde(rename = "_shards")]
    pub shards: Shards,
}

/// Answer to `get`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GetResponse {
    #[serde(flatten)]
    pub document: Option<Document>,
    pub found: bool,
}

impl GetResponse {
    pub fn found(document: Document) -> Self {
        Self {
            document: Some(document),
            found: true,
        }
    }

    pub fn missing() -> Self {
        Self {
            document: None,
            found: false,
        }
    }
}

/// Answer to `mget`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MgetResponse {
    pub docs: Vec<GetResponse>,
}

/// Answer to `delete`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteResponse {
    pub found: bool,
    #[serde(rename = "_index", skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    #[serde(rename = "_type", skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "_version", skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl DeleteResponse {
    pub fn missing() -> Self {
        Self {
            found: false,
            index: None,
            doc_type: None,
            id: None,
            version: None,
            result: None,
        }
    }
}

/// Answer to `update`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateResponse {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_type")]
    pub doc_type: String,
    #[serde(rename = "_version")]
    pub version: u64,
    pub result: String,
    #[serde(rename = "_shards")]
    pub shards: Shards,
}

/// Answer to `update_by_query`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateByQueryResponse {
    pub took: u64,
    pub timed_out: bool,
    pub total: usize,
    pub updated: usize,
    pub deleted: usize,
    pub batches: usize,
    pub version_conflicts: usize,
    pub noops: usize,
    pub retries: usize,
    pub throttled_millis: u64,
    pub requests_per_second: u64,
    pub throttled_until_millis: u64,
    pub failures: Vec<JsonValue>,
}

/// One item of a bulk answer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkItem {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_type")]
    pub doc_type: String,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_version")]
    pub version: u64,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Answer to `bulk`; each item is keyed by its action name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkResponse {
    pub took: u64,
    pub errors: bool,
    pub items: Vec<BTreeMap<String, BulkItem>>,
}

/// `hits.total`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TotalHits {
    pub value: usize,
    pub relation: &'static str,
}

/// A search hit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hit {
    #[serde(flatten)]
    pub document: Document,
    #[serde(rename = "_score")]
    pub score: f64,
}

/// `hits` block of a search answer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hits {
    pub total: TotalHits,
    pub max_score: f64,
    pub hits: Vec<Hit>,
}

/// Result of one named aggregation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    pub doc_count_error_upper_bound: u64,
    pub sum_other_doc_count: u64,
    pub buckets: Vec<Bucket>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_key: Option<BTreeMap<String, Value>>,
}

/// Answer to `search` and `scroll`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    pub took: u64,
    pub timed_out: bool,
    #[serde(rename = "_shards")]
    pub shards: Shards,
    pub hits: Hits,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregations: Option<BTreeMap<String, AggregationResult>>,
    #[serde(rename = "_scroll_id", skip_serializing_if = "Option::is_none")]
    pub scroll_id: Option<String>,
}

impl SearchResponse {
    /// Sources of the returned hits, in hit order
    pub fn sources(&self) -> Vec<&Value> {
        self.hits.hits.iter().map(|hit| &hit.document.source).collect()
    }

    /// Ids of the returned hits, in hit order
    pub fn ids(&self) -> Vec<&str> {
        self.hits.hits.iter().map(|hit| hit.document.id.as_str()).collect()
    }

    pub fn total(&self) -> usize {
        self.hits.total.value
    }
}

/// Answer to `count`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountResponse {
    pub count: usize,
    #[serde(rename = "_shards")]
    pub shards: Shards,
}

/// Answer to `msearch`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MsearchResponse {
    pub took: u64,
    pub responses: Vec<SearchResponse>,
}

/// One suggestion option
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestOption {
    pub text: Value,
    pub freq: u64,
    pub score: f64,
}

/// Suggestions for one input text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestEntry {
    pub text: Value,
    pub length: usize,
    pub options: Vec<SuggestOption>,
    pub offset: usize,
}

/// Answer to `suggest`, keyed by suggestion name
pub type SuggestResponse = BTreeMap<String, Vec<SuggestEntry>>;

/// Answer to `create_pit`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PitResponse {
    pub pit_id: String,
    #[serde(rename = "_shards")]
    pub shards: Shards,
    pub creation_time: i64,
}

/// Version block of `info`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionInfo {
    pub distribution: &'static str,
    pub number: &'static str,
    pub build_hash: &'static str,
    pub build_timestamp: &'static str,
    pub build_snapshot: bool,
    pub lucene_version: &'static str,
}

/// Answer to `info`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoResponse {
    pub status: u16,
    pub name: &'static str,
    pub cluster_name: &'static str,
    pub cluster_uuid: String,
    pub version: VersionInfo,
    pub tagline: &'static str,
}
