//! Registry and API Tests
//!
//! Requests go through `ApiHandler::handle` exactly as the NDJSON loop
//! feeds them: one JSON string in, one envelope out.

use serde_json::{json, Value};

use openmock::api::{ApiHandler, Response};
use openmock::registry::{normalize_hosts, HostSpec, Registry};

fn handle(handler: &mut ApiHandler, request: Value) -> Response {
    handler.handle(&request.to_string())
}

fn envelope(response: &Response) -> Value {
    serde_json::from_str(&response.to_json()).unwrap()
}

// =============================================================================
// Host Normalization
// =============================================================================

/// Test: Equivalent host spellings normalize to the same key.
#[test]
fn test_host_spellings() {
    let spellings = [
        json!("localhost"),
        json!("localhost:9200"),
        json!("http://localhost:9200"),
        json!({"host": "localhost", "port": 9200}),
        json!([{"host": "localhost"}]),
        json!([]),
    ];

    for hosts in spellings {
        let normalized = normalize_hosts(Some(&hosts)).unwrap();
        assert_eq!(normalized[0].key(), "localhost:9200", "hosts {}", hosts);
    }
    assert_eq!(normalize_hosts(None).unwrap(), vec![HostSpec::default()]);
}

/// Test: Only the first host decides which store is used.
#[test]
fn test_first_host_decides() {
    let mut registry = Registry::new();
    let first = registry.connect(&[HostSpec::new("a", 9200), HostSpec::new("b", 9200)]);
    let again = registry.connect(&[HostSpec::new("a", 9200)]);
    let other = registry.connect(&[HostSpec::new("b", 9200)]);

    first
        .borrow_mut()
        .index("logs", json!({"n": 1}), Some("1"))
        .unwrap();
    assert_eq!(again.borrow().document_count("logs"), Some(1));
    assert_eq!(other.borrow().document_count("logs"), None);
    assert_eq!(registry.len(), 2);
}

// =============================================================================
// Request Round Trips
// =============================================================================

/// Test: Documents written through one request are visible to the next.
#[test]
fn test_index_then_search() {
    let mut handler = ApiHandler::default();

    let indexed = handle(
        &mut handler,
        json!({"op": "index", "index": "logs", "id": 1, "body": {"msg": "Hello World"}}),
    );
    assert!(indexed.is_success());
    assert_eq!(indexed.data().unwrap()["_id"], "1");

    let searched = handle(
        &mut handler,
        json!({"op": "search", "index": "logs", "body": {"query": {"match": {"msg": "hello"}}}}),
    );
    let data = searched.data().unwrap();
    assert_eq!(data["hits"]["total"]["value"], 1);
    assert_eq!(data["hits"]["hits"][0]["_source"]["msg"], "Hello World");
}

/// Test: Requests for different hosts see different stores.
#[test]
fn test_hosts_are_isolated() {
    let mut handler = ApiHandler::default();

    handle(
        &mut handler,
        json!({"op": "index", "hosts": "first:9200", "index": "logs", "body": {"n": 1}}),
    );
    let elsewhere = handle(
        &mut handler,
        json!({"op": "indices.exists", "hosts": ["second:9200"], "index": "logs"}),
    );
    assert_eq!(elsewhere.data(), Some(&json!(false)));

    let same = handle(
        &mut handler,
        json!({"op": "indices.exists", "hosts": {"host": "first", "port": 9200}, "index": "logs"}),
    );
    assert_eq!(same.data(), Some(&json!(true)));
}

/// Test: A request without hosts goes to the handler's default host.
#[test]
fn test_default_host() {
    let mut handler = ApiHandler::new(Registry::new(), HostSpec::new("search", 9300));

    handle(
        &mut handler,
        json!({"op": "index", "index": "logs", "id": "1", "body": {"n": 1}}),
    );
    let explicit = handle(
        &mut handler,
        json!({"op": "exists", "hosts": "search:9300", "index": "logs", "id": "1"}),
    );
    assert_eq!(explicit.data(), Some(&json!(true)));
}

/// Test: Bulk accepts a list of line objects.
#[test]
fn test_bulk_line_list() {
    let mut handler = ApiHandler::default();

    let response = handle(
        &mut handler,
        json!({
            "op": "bulk",
            "index": "logs",
            "body": [
                {"index": {"_id": "1"}},
                {"n": 1},
                {"create": {"_id": "2"}},
                {"n": 2}
            ]
        }),
    );
    let data = response.data().unwrap();
    assert_eq!(data["errors"], false);
    assert_eq!(data["items"][1]["create"]["status"], 201);

    let counted = handle(&mut handler, json!({"op": "count", "index": "logs"}));
    assert_eq!(counted.data().unwrap()["count"], 2);
}

/// Test: A scroll search can be followed with the scroll op.
#[test]
fn test_scroll_round_trip() {
    let mut handler = ApiHandler::default();
    for n in 0..15 {
        handle(
            &mut handler,
            json!({"op": "index", "index": "logs", "body": {"n": n}}),
        );
    }

    let first = handle(
        &mut handler,
        json!({"op": "search", "index": "logs", "params": {"scroll": "1m"}}),
    );
    let first = first.data().unwrap().clone();
    assert_eq!(first["hits"]["hits"].as_array().unwrap().len(), 10);

    let second = handle(
        &mut handler,
        json!({"op": "scroll", "scroll_id": first["_scroll_id"]}),
    );
    assert_eq!(second.data().unwrap()["hits"]["hits"].as_array().unwrap().len(), 5);
}

// =============================================================================
// Error Envelopes
// =============================================================================

/// Test: Store errors carry their status and the service's error body.
#[test]
fn test_not_found_envelope() {
    let mut handler = ApiHandler::default();

    let response = handle(
        &mut handler,
        json!({"op": "get", "index": "logs", "id": "missing"}),
    );
    assert!(!response.is_success());

    let body = envelope(&response);
    assert_eq!(body["status"], "error");
    assert_eq!(body["status_code"], 404);
    assert_eq!(body["error"]["error"]["type"], "document_missing_exception");
}

/// Test: ignore=404 turns a missing document into found=false.
#[test]
fn test_ignore_param() {
    let mut handler = ApiHandler::default();

    let response = handle(
        &mut handler,
        json!({"op": "get", "index": "logs", "id": "missing", "params": {"ignore": 404}}),
    );
    assert_eq!(response.data(), Some(&json!({"found": false})));
}

/// Test: Unknown operations and malformed JSON are rejected.
#[test]
fn test_rejected_requests() {
    let mut handler = ApiHandler::default();

    let unknown = envelope(&handle(&mut handler, json!({"op": "reindex"})));
    assert_eq!(unknown["code"], "OPENMOCK_UNKNOWN_OPERATION");

    let malformed = handler.handle("{not json");
    assert_eq!(envelope(&malformed)["code"], "OPENMOCK_INVALID_REQUEST");

    let missing_index = envelope(&handle(&mut handler, json!({"op": "get", "id": "1"})));
    assert_eq!(missing_index["code"], "OPENMOCK_INVALID_REQUEST");
}

/// Test: Server failure answers every call with the fixed 500 body.
#[test]
fn test_server_failure_envelope() {
    let mut handler = ApiHandler::default();
    handle(&mut handler, json!({"op": "server_failure.enable"}));

    let body = envelope(&handle(&mut handler, json!({"op": "ping"})));
    assert_eq!(body["status_code"], 500);
    assert_eq!(
        body["error"],
        json!({"status_code": 500, "error": "Internal Server Error"})
    );

    handle(&mut handler, json!({"op": "server_failure.disable"}));
    let ping = handle(&mut handler, json!({"op": "ping"}));
    assert_eq!(ping.data(), Some(&json!(true)));
}

/// Test: Clearing the registry starts from empty stores.
#[test]
fn test_registry_clear() {
    let mut handler = ApiHandler::default();
    handle(
        &mut handler,
        json!({"op": "index", "index": "logs", "id": "1", "body": {"n": 1}}),
    );

    handler.registry_mut().clear();
    assert!(handler.registry().is_empty());

    let exists = handle(&mut handler, json!({"op": "indices.exists", "index": "logs"}));
    assert_eq!(exists.data(), Some(&json!(false)));
}
