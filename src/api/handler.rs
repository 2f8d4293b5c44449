//! API handler
//!
//! Resolves the target store through the registry and dispatches one
//! decoded request to it. Every call is synchronous.

use serde::Serialize;
use serde_json::{json, Value};

use super::errors::{ApiError, ApiResult};
use super::request::{Operation, Request};
use super::response::Response;
use crate::observability::{log_event_with_fields, Event};
use crate::registry::{HostSpec, Registry};
use crate::store::FakeSearch;

/// Dispatches requests to the stores of a registry
#[derive(Debug, Default)]
pub struct ApiHandler {
    registry: Registry,
    /// Target of requests that name no hosts
    default_host: HostSpec,
}

impl ApiHandler {
    pub fn new(registry: Registry, default_host: HostSpec) -> Self {
        Self {
            registry,
            default_host,
        }
    }

    pub fn default_host(&self) -> &HostSpec {
        &self.default_host
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Handle a raw JSON request string
    pub fn handle(&mut self, json_request: &str) -> Response {
        let request = match Request::parse(json_request) {
            Ok(r) => r,
            Err(e) => return self.fail(e),
        };

        match self.execute(request) {
            Ok(data) => Response::success(data),
            Err(e) => self.fail(e),
        }
    }

    /// Run a decoded request against the store of its first host
    pub fn execute(&mut self, request: Request) -> ApiResult<Value> {
        let shared = if request.hosts.is_empty() {
            self.registry.connect(std::slice::from_ref(&self.default_host))
        } else {
            self.registry.connect(&request.hosts)
        };
        let mut store = shared.borrow_mut();
        dispatch(&mut store, request.operation)
    }

    fn fail(&self, err: ApiError) -> Response {
        log_event_with_fields(
            Event::RequestFailed,
            &[
                ("code", err.code()),
                ("status", &err.status_code().to_string()),
            ],
        );
        Response::error(&err)
    }
}

fn to_data<T: Serialize>(value: T) -> ApiResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| ApiError::invalid_request(format!("Failed to serialize response: {}", e)))
}

fn dispatch(store: &mut FakeSearch, operation: Operation) -> ApiResult<Value> {
    match operation {
        Operation::Ping => to_data(store.ping()?),
        Operation::Info => to_data(store.info()?),
        Operation::Create { index, id, body } => {
            to_data(store.create(&index, id.as_deref(), body)?)
        }
        Operation::Index { index, id, body } => {
            to_data(store.index(&index, body, id.as_deref())?)
        }
        Operation::Exists { index, id } => to_data(store.exists(&index, &id)?),
        Operation::Get { index, id, params } => to_data(store.get(&index, &id, &params)?),
        Operation::GetSource { index, id, params } => {
            to_data(store.get_source(&index, &id, &params)?)
        }
        Operation::Mget { index, body } => to_data(store.mget(&body, index.as_deref())?),
        Operation::Update { index, id, body } => to_data(store.update(&index, &id, body)?),
        Operation::UpdateByQuery { index, body } => {
            to_data(store.update_by_query(&index, &body)?)
        }
        Operation::Delete { index, id, params } => {
            to_data(store.delete(&index, &id, &params)?)
        }
        Operation::Bulk { index, body } => to_data(store.bulk(&body, index.as_deref())?),
        Operation::Search {
            index,
            body,
            params,
        } => to_data(store.search(body.as_ref(), index, &params)?),
        Operation::Scroll { scroll_id } => to_data(store.scroll(&scroll_id)?),
        Operation::ClearScroll { scroll_id } => {
            let cleared = store.clear_scroll(&scroll_id)?;
            Ok(json!({"succeeded": true, "num_freed": usize::from(cleared)}))
        }
        Operation::Count { index, body } => to_data(store.count(body.as_ref(), index)?),
        Operation::Msearch { body } => to_data(store.msearch(&body)?),
        Operation::Suggest { index, body } => to_data(store.suggest(&body, index.as_deref())?),
        Operation::CreatePit { index } => to_data(store.create_pit(&index)?),
        Operation::IndicesCreate { index } => to_data(store.indices().create(&index)?),
        Operation::IndicesExists { index } => to_data(store.indices().exists(&index)?),
        Operation::IndicesRefresh { index } => {
            store.indices().refresh(index.as_deref())?;
            Ok(json!({"_shards": {"total": 1, "successful": 1, "failed": 0}}))
        }
        Operation::IndicesDelete { index } => to_data(store.indices().delete(&index)?),
        Operation::EnableServerFailure => {
            store.enable_server_failure();
            Ok(json!({"server_failure": true}))
        }
        Operation::DisableServerFailure => {
            store.disable_server_failure();
            Ok(json!({"server_failure": false}))
        }
        Operation::Metrics => serde_json::from_str(&store.metrics().to_json())
            .map_err(|e| ApiError::invalid_request(format!("Failed to read metrics: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(response: &Response) -> &Value {
        response.data().expect("success response")
    }

    #[test]
    fn test_index_then_get() {
        let mut handler = ApiHandler::default();
        let resp = handler.handle(r#"{"op": "index", "index": "users", "id": "1", "body": {"name": "Alice"}}"#);
        assert!(resp.is_success());
        assert_eq!(data(&resp)["result"], "created");

        let resp = handler.handle(r#"{"op": "get", "index": "users", "id": "1"}"#);
        assert_eq!(data(&resp)["_source"]["name"], "Alice");
        assert_eq!(data(&resp)["found"], true);
    }

    #[test]
    fn test_hosts_select_store() {
        let mut handler = ApiHandler::default();
        handler.handle(r#"{"op": "index", "index": "users", "id": "1", "body": {}}"#);

        let resp = handler.handle(r#"{"op": "exists", "hosts": "other:9201", "index": "users", "id": "1"}"#);
        assert_eq!(data(&resp), &json!(false));
        assert_eq!(handler.registry().len(), 2);
    }

    #[test]
    fn test_default_host_from_handler() {
        let mut handler = ApiHandler::new(Registry::new(), HostSpec::new("search", 9300));
        handler.handle(r#"{"op": "index", "index": "users", "id": "1", "body": {}}"#);

        let resp = handler.handle(r#"{"op": "exists", "hosts": "search:9300", "index": "users", "id": "1"}"#);
        assert_eq!(data(&resp), &json!(true));
    }

    #[test]
    fn test_missing_document_is_404() {
        let mut handler = ApiHandler::default();
        let resp = handler.handle(r#"{"op": "get", "index": "users", "id": "nope"}"#);
        match resp {
            Response::Error(err) => {
                assert_eq!(err.status_code, 404);
                assert_eq!(err.code, "document_missing_exception");
            }
            Response::Success(_) => panic!("Expected error"),
        }
    }

    #[test]
    fn test_server_failure_switch() {
        let mut handler = ApiHandler::default();
        handler.handle(r#"{"op": "server_failure.enable"}"#);
        let resp = handler.handle(r#"{"op": "ping"}"#);
        assert!(!resp.is_success());

        handler.handle(r#"{"op": "server_failure.disable"}"#);
        let resp = handler.handle(r#"{"op": "ping"}"#);
        assert_eq!(data(&resp), &json!(true));
    }

    #[test]
    fn test_invalid_json() {
        let mut handler = ApiHandler::default();
        let resp = handler.handle("not json");
        assert!(resp.to_json().contains("OPENMOCK_INVALID_REQUEST"));
    }
}
