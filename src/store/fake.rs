//! The in-memory store and its document operations

use std::collections::{BTreeMap, HashMap};

use serde_json::Value as JsonValue;

use super::document::{id_from_json, merge_source, Document, DEFAULT_DOC_TYPE};
use super::errors::{StoreError, StoreResult};
use super::ids::{cluster_uuid, random_id};
use super::params::RequestParams;
use super::response::{
    DeleteResponse, GetResponse, InfoResponse, MgetResponse, Shards, UpdateResponse,
    VersionInfo, WriteResponse,
};
use super::search::ScrollState;
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::value::Value;

/// An in-process emulator of a search service.
///
/// Owns every index, each an insertion-ordered list of documents, and the
/// open scroll cursors. All operations are synchronous.
#[derive(Debug)]
pub struct FakeSearch {
    pub(super) indices: BTreeMap<String, Vec<Document>>,
    pub(super) scrolls: HashMap<String, ScrollState>,
    server_failure: bool,
    cluster_uuid: String,
    pub(super) metrics: MetricsRegistry,
}

impl Default for FakeSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeSearch {
    pub fn new() -> Self {
        Self {
            indices: BTreeMap::new(),
            scrolls: HashMap::new(),
            server_failure: false,
            cluster_uuid: cluster_uuid(),
            metrics: MetricsRegistry::new(),
        }
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    // ==================
    // Fault injection
    // ==================

    /// Makes every subsequent call answer with a server failure
    pub fn enable_server_failure(&mut self) {
        self.server_failure = true;
        log_event_with_fields(Event::ServerFailureEnabled, &[("cluster_uuid", &self.cluster_uuid)]);
    }

    pub fn disable_server_failure(&mut self) {
        self.server_failure = false;
        log_event_with_fields(Event::ServerFailureDisabled, &[("cluster_uuid", &self.cluster_uuid)]);
    }

    pub fn is_failing(&self) -> bool {
        self.server_failure
    }

    pub(super) fn available(&self) -> StoreResult<()> {
        if self.server_failure {
            self.metrics.increment_server_failures();
            log_event_with_fields(Event::ServerFailureReturned, &[]);
            return Err(StoreError::ServerFailure);
        }
        Ok(())
    }

    // ==================
    // Internals
    // ==================

    /// Creates `index` if missing; returns whether it was created
    pub(super) fn ensure_index(&mut self, index: &str) -> bool {
        if self.indices.contains_key(index) {
            return false;
        }
        self.indices.insert(index.to_string(), Vec::new());
        log_event_with_fields(Event::IndexCreated, &[("index", index)]);
        true
    }

    pub(super) fn find(&self, index: &str, id: &str) -> Option<&Document> {
        self.indices.get(index)?.iter().find(|doc| doc.id == id)
    }

    pub(super) fn find_mut(&mut self, index: &str, id: &str) -> Option<&mut Document> {
        self.indices.get_mut(index)?.iter_mut().find(|doc| doc.id == id)
    }

    /// Stores `source` under `id`, replacing any previous version.
    ///
    /// A replaced document moves to the end of the index with its version
    /// bumped by one. Returns the new version and whether it was created.
    pub(super) fn put(
        &mut self,
        index: &str,
        id: &str,
        doc_type: &str,
        source: Value,
    ) -> (u64, bool) {
        self.ensure_index(index);
        let documents = self.indices.entry(index.to_string()).or_default();

        let previous = documents
            .iter()
            .position(|doc| doc.id == id)
            .map(|pos| documents.remove(pos));
        let version = previous.as_ref().map_or(1, |doc| doc.version + 1);

        documents.push(Document {
            version,
            ..Document::new(index, id, source).with_type(doc_type)
        });

        self.metrics.increment_documents_indexed();
        self.refresh_document_gauge();
        log_event_with_fields(
            Event::DocumentIndexed,
            &[("id", id), ("index", index), ("version", &version.to_string())],
        );
        (version, previous.is_none())
    }

    /// Removes a document; returns it when present
    pub(super) fn remove(&mut self, index: &str, id: &str) -> Option<Document> {
        let documents = self.indices.get_mut(index)?;
        let pos = documents.iter().position(|doc| doc.id == id)?;
        let removed = documents.remove(pos);

        self.metrics.increment_documents_deleted();
        self.refresh_document_gauge();
        log_event_with_fields(Event::DocumentDeleted, &[("id", id), ("index", index)]);
        Some(removed)
    }

    pub(super) fn refresh_document_gauge(&self) {
        let total: usize = self.indices.values().map(Vec::len).sum();
        self.metrics.set_documents(total as u64);
    }

    // ==================
    // Cluster
    // ==================

    pub fn ping(&self) -> StoreResult<bool> {
        self.available()?;
        Ok(true)
    }

    pub fn info(&self) -> StoreResult<InfoResponse> {
        self.available()?;
        Ok(InfoResponse {
            status: 200,
            name: "openmock",
            cluster_name: "openmock",
            cluster_uuid: self.cluster_uuid.clone(),
            version: VersionInfo {
                distribution: "opensearch",
                number: "2.11.0",
                build_hash: "4dcad6dd1fd45b6bd91f041a041829c8687278fa",
                build_timestamp: "2023-10-13T02:55:55.511945994Z",
                build_snapshot: false,
                lucene_version: "9.7.0",
            },
            tagline: "The OpenSearch Project: https://opensearch.org/",
        })
    }

    // ==================
    // Documents
    // ==================

    /// Stores a new document; fails with a conflict when the id is taken
    pub fn create(
        &mut self,
        index: &str,
        id: Option<&str>,
        body: impl Into<Value>,
    ) -> StoreResult<WriteResponse> {
        self.available()?;
        let id = id.map(str::to_string).unwrap_or_else(random_id);

        if self.find(index, &id).is_some() {
            return Err(StoreError::Conflict {
                index: index.to_string(),
                id,
            });
        }

        let (version, _) = self.put(index, &id, DEFAULT_DOC_TYPE, body.into());
        Ok(write_response(index, id, version, true))
    }

    /// Stores a document, replacing any document with the same id
    pub fn index(
        &mut self,
        index: &str,
        body: impl Into<Value>,
        id: Option<&str>,
    ) -> StoreResult<WriteResponse> {
        self.available()?;
        let id = id.map(str::to_string).unwrap_or_else(random_id);

        let (version, created) = self.put(index, &id, DEFAULT_DOC_TYPE, body.into());
        Ok(write_response(index, id, version, created))
    }

    pub fn exists(&self, index: &str, id: &str) -> StoreResult<bool> {
        self.available()?;
        Ok(self.find(index, id).is_some())
    }

    pub fn get(&self, index: &str, id: &str, params: &RequestParams) -> StoreResult<GetResponse> {
        self.available()?;
        match self.find(index, id) {
            Some(document) => Ok(GetResponse::found(document.clone())),
            None if params.ignores(404) => Ok(GetResponse::missing()),
            None => Err(StoreError::DocumentNotFound {
                index: index.to_string(),
                id: id.to_string(),
            }),
        }
    }

    /// Source of a document; `None` when missing and 404 is ignored
    pub fn get_source(
        &self,
        index: &str,
        id: &str,
        params: &RequestParams,
    ) -> StoreResult<Option<Value>> {
        Ok(self.get(index, id, params)?.document.map(|doc| doc.source))
    }

    /// Fetches several documents; `docs` entries carry `_id` and optionally `_index`
    pub fn mget(&self, body: &JsonValue, index: Option<&str>) -> StoreResult<MgetResponse> {
        self.available()?;
        let requested = body
            .get("docs")
            .and_then(JsonValue::as_array)
            .ok_or_else(|| StoreError::validation("Validation Failed: 1: no documents to get;"))?;

        let docs: Vec<GetResponse> = requested
            .iter()
            .filter_map(|entry| {
                let id = entry.get("_id").and_then(id_from_json)?;
                let index = entry
                    .get("_index")
                    .and_then(JsonValue::as_str)
                    .or(index)?;
                self.find(index, &id).cloned().map(GetResponse::found)
            })
            .collect();

        if docs.is_empty() {
            return Err(StoreError::validation("Validation Failed: 1: no documents to get;"));
        }
        Ok(MgetResponse { docs })
    }

    /// Partially updates a document with `{"doc": {...}}`
    pub fn update(
        &mut self,
        index: &str,
        id: &str,
        body: impl Into<Value>,
    ) -> StoreResult<UpdateResponse> {
        self.available()?;
        let body = body.into();

        let members = match body.as_object() {
            Some(members) if !members.is_empty() => members,
            _ => {
                return Err(StoreError::validation(
                    "Validation Failed: 1: script or doc is missing;",
                ))
            }
        };
        let doc = members.get("doc");
        let script = members.get("script");

        match (doc, script) {
            (None, None) => {
                let field = members.keys().next().cloned().unwrap_or_default();
                return Err(StoreError::BadRequest {
                    error_type: "x_content_parse_exception",
                    reason: format!("[1:2] [UpdateRequest] unknown field [{}]", field),
                });
            }
            (Some(_), Some(_)) => {
                return Err(StoreError::validation(
                    "Validation Failed: 1: can't provide both script and doc;",
                ))
            }
            _ => {}
        }

        let patch = doc.cloned();
        let Some(document) = self.find_mut(index, id) else {
            return Err(StoreError::DocumentNotFound {
                index: index.to_string(),
                id: id.to_string(),
            });
        };
        let Some(patch) = patch else {
            return Err(StoreError::NotImplemented(
                "Using script is currently not supported.".to_string(),
            ));
        };

        merge_source(&mut document.source, patch);
        document.version += 1;
        let response = UpdateResponse {
            index: document.index.clone(),
            id: document.id.clone(),
            doc_type: document.doc_type.clone(),
            version: document.version,
            result: "updated".to_string(),
            shards: Shards::of(1),
        };

        self.metrics.increment_documents_updated();
        log_event_with_fields(
            Event::DocumentUpdated,
            &[("id", id), ("index", index), ("version", &response.version.to_string())],
        );
        Ok(response)
    }

    pub fn delete(
        &mut self,
        index: &str,
        id: &str,
        params: &RequestParams,
    ) -> StoreResult<DeleteResponse> {
        self.available()?;
        match self.remove(index, id) {
            Some(removed) => Ok(DeleteResponse {
                found: true,
                index: Some(removed.index),
                doc_type: Some(removed.doc_type),
                id: Some(removed.id),
                version: Some(removed.version),
                result: Some("deleted".to_string()),
            }),
            None if params.ignores(404) => Ok(DeleteResponse::missing()),
            None => Err(StoreError::DocumentNotFound {
                index: index.to_string(),
                id: id.to_string(),
            }),
        }
    }

    /// Number of documents in `index`, if it exists
    pub fn document_count(&self, index: &str) -> Option<usize> {
        self.indices.get(index).map(Vec::len)
    }
}

fn write_response(index: &str, id: String, version: u64, created: bool) -> WriteResponse {
    WriteResponse {
        index: index.to_string(),
        doc_type: DEFAULT_DOC_TYPE.to_string(),
        id,
        version,
        result: if created { "created" } else { "updated" }.to_string(),
        created,
        shards: Shards::of(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_index_generates_id() {
        let mut store = FakeSearch::new();
        let response = store.index("logs", json!({"a": 1}), None).unwrap();

        assert_eq!(response.id.len(), 20);
        assert_eq!(response.version, 1);
        assert_eq!(response.result, "created");
        assert_eq!(store.document_count("logs"), Some(1));
    }

    #[test]
    fn test_reindex_bumps_version() {
        let mut store = FakeSearch::new();
        store.index("logs", json!({"a": 1}), Some("1")).unwrap();
        let response = store.index("logs", json!({"a": 2}), Some("1")).unwrap();

        assert_eq!(response.version, 2);
        assert_eq!(response.result, "updated");
        assert_eq!(store.document_count("logs"), Some(1));
    }

    #[test]
    fn test_put_moves_replaced_document_to_end() {
        let mut store = FakeSearch::new();
        store.index("logs", json!({"n": 1}), Some("a")).unwrap();
        store.index("logs", json!({"n": 2}), Some("b")).unwrap();
        store.index("logs", json!({"n": 3}), Some("a")).unwrap();

        let ids: Vec<&str> = store.indices["logs"].iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_update_script_is_not_implemented() {
        let mut store = FakeSearch::new();
        store.index("logs", json!({"a": 1}), Some("1")).unwrap();

        let err = store
            .update("logs", "1", json!({"script": {"source": "ctx._source.a = 2"}}))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotImplemented(_)));
    }

    #[test]
    fn test_failure_switch() {
        let mut store = FakeSearch::new();
        store.enable_server_failure();
        assert!(matches!(store.ping(), Err(StoreError::ServerFailure)));
        assert_eq!(store.metrics().snapshot().server_failures, 1);

        store.disable_server_failure();
        assert!(store.ping().unwrap());
    }
}
