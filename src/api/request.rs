//! API request types
//!
//! One JSON object per request: `op` names the call, `hosts` picks the
//! store instance and the remaining members are the call's arguments.

use serde::Deserialize;
use serde_json::Value;

use super::errors::{ApiError, ApiResult};
use crate::registry::{normalize_hosts, HostSpec};
use crate::store::{IndexTarget, RequestParams};

/// A decoded store call
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Ping,
    Info,
    Create { index: String, id: Option<String>, body: Value },
    Index { index: String, id: Option<String>, body: Value },
    Exists { index: String, id: String },
    Get { index: String, id: String, params: RequestParams },
    GetSource { index: String, id: String, params: RequestParams },
    Mget { index: Option<String>, body: Value },
    Update { index: String, id: String, body: Value },
    UpdateByQuery { index: String, body: Value },
    Delete { index: String, id: String, params: RequestParams },
    Bulk { index: Option<String>, body: String },
    Search { index: IndexTarget, body: Option<Value>, params: RequestParams },
    Scroll { scroll_id: String },
    ClearScroll { scroll_id: String },
    Count { index: IndexTarget, body: Option<Value> },
    Msearch { body: Vec<Value> },
    Suggest { index: Option<String>, body: Value },
    CreatePit { index: String },
    IndicesCreate { index: String },
    IndicesExists { index: String },
    IndicesRefresh { index: Option<String> },
    IndicesDelete { index: String },
    EnableServerFailure,
    DisableServerFailure,
    Metrics,
}

/// A request: the target hosts and the call
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Empty when the request names no hosts
    pub hosts: Vec<HostSpec>,
    pub operation: Operation,
}

/// Raw request for parsing
#[derive(Debug, Clone, Deserialize)]
struct RawRequest {
    op: String,
    #[serde(default)]
    hosts: Option<Value>,
    #[serde(default)]
    index: Option<Value>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    body: Option<Value>,
    #[serde(default)]
    params: RequestParams,
    #[serde(default)]
    scroll_id: Option<String>,
}

impl RawRequest {
    fn index(&self) -> ApiResult<String> {
        self.optional_index()?
            .ok_or_else(|| ApiError::invalid_request("Missing index"))
    }

    fn optional_index(&self) -> ApiResult<Option<String>> {
        match &self.index {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(index)) => Ok(Some(index.clone())),
            Some(other) => Err(ApiError::invalid_request(format!(
                "index must be a string, got {}",
                other
            ))),
        }
    }

    fn target(&self) -> ApiResult<IndexTarget> {
        Ok(IndexTarget::from_json(self.index.as_ref())?)
    }

    fn id(&self) -> ApiResult<String> {
        self.optional_id()?
            .ok_or_else(|| ApiError::invalid_request("Missing id"))
    }

    fn optional_id(&self) -> ApiResult<Option<String>> {
        match &self.id {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(id)) => Ok(Some(id.clone())),
            Some(Value::Number(id)) => Ok(Some(id.to_string())),
            Some(other) => Err(ApiError::invalid_request(format!(
                "id must be a string or number, got {}",
                other
            ))),
        }
    }

    fn body(&mut self) -> ApiResult<Value> {
        self.body
            .take()
            .ok_or_else(|| ApiError::invalid_request("Missing body"))
    }

    fn scroll_id(&mut self) -> ApiResult<String> {
        self.scroll_id
            .take()
            .or_else(|| {
                self.body
                    .as_ref()
                    .and_then(|body| body.get("scroll_id"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .ok_or_else(|| ApiError::invalid_request("Missing scroll_id"))
    }
}

/// Bulk bodies are either NDJSON text or a list of line objects
fn bulk_body(body: Value) -> ApiResult<String> {
    match body {
        Value::String(text) => Ok(text),
        Value::Array(lines) => Ok(lines
            .iter()
            .map(Value::to_string)
            .collect::<Vec<_>>()
            .join("\n")),
        other => Err(ApiError::invalid_request(format!(
            "bulk body must be a string or a list, got {}",
            other
        ))),
    }
}

impl Request {
    /// Parse a request from JSON string
    pub fn parse(json: &str) -> ApiResult<Self> {
        let mut raw: RawRequest = serde_json::from_str(json)
            .map_err(|e| ApiError::invalid_request(format!("Invalid JSON: {}", e)))?;

        let hosts = match &raw.hosts {
            None => Vec::new(),
            Some(hosts) => normalize_hosts(Some(hosts))?,
        };

        let operation = match raw.op.as_str() {
            "ping" => Operation::Ping,
            "info" => Operation::Info,
            "create" => Operation::Create {
                index: raw.index()?,
                id: raw.optional_id()?,
                body: raw.body()?,
            },
            "index" => Operation::Index {
                index: raw.index()?,
                id: raw.optional_id()?,
                body: raw.body()?,
            },
            "exists" => Operation::Exists {
                index: raw.index()?,
                id: raw.id()?,
            },
            "get" => Operation::Get {
                index: raw.index()?,
                id: raw.id()?,
                params: raw.params.clone(),
            },
            "get_source" => Operation::GetSource {
                index: raw.index()?,
                id: raw.id()?,
                params: raw.params.clone(),
            },
            "mget" => Operation::Mget {
                index: raw.optional_index()?,
                body: raw.body()?,
            },
            "update" => Operation::Update {
                index: raw.index()?,
                id: raw.id()?,
                body: raw.body()?,
            },
            "update_by_query" => Operation::UpdateByQuery {
                index: raw.index()?,
                body: raw.body()?,
            },
            "delete" => Operation::Delete {
                index: raw.index()?,
                id: raw.id()?,
                params: raw.params.clone(),
            },
            "bulk" => Operation::Bulk {
                index: raw.optional_index()?,
                body: bulk_body(raw.body()?)?,
            },
            "search" => Operation::Search {
                index: raw.target()?,
                body: raw.body.take(),
                params: raw.params.clone(),
            },
            "scroll" => Operation::Scroll {
                scroll_id: raw.scroll_id()?,
            },
            "clear_scroll" => Operation::ClearScroll {
                scroll_id: raw.scroll_id()?,
            },
            "count" => Operation::Count {
                index: raw.target()?,
                body: raw.body.take(),
            },
            "msearch" => match raw.body()? {
                Value::Array(body) => Operation::Msearch { body },
                other => {
                    return Err(ApiError::invalid_request(format!(
                        "msearch body must be a list, got {}",
                        other
                    )))
                }
            },
            "suggest" => Operation::Suggest {
                index: raw.optional_index()?,
                body: raw.body()?,
            },
            "create_pit" => Operation::CreatePit {
                index: raw.optional_index()?.unwrap_or_default(),
            },
            "indices.create" => Operation::IndicesCreate {
                index: raw.index()?,
            },
            "indices.exists" => Operation::IndicesExists {
                index: raw.index()?,
            },
            "indices.refresh" => Operation::IndicesRefresh {
                index: raw.optional_index()?,
            },
            "indices.delete" => Operation::IndicesDelete {
                index: raw.index()?,
            },
            "server_failure.enable" => Operation::EnableServerFailure,
            "server_failure.disable" => Operation::DisableServerFailure,
            "metrics" => Operation::Metrics,
            other => return Err(ApiError::unknown_operation(other)),
        };

        Ok(Request { hosts, operation })
    }
}
