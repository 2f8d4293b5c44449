//! Range Query Tests
//!
//! Point ranges over integers and timestamps, and interval relations over
//! range-shaped document values.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde_json::{json, Value as JsonValue};

use openmock::store::{FakeSearch, RequestParams, SearchResponse};
use openmock::value::Value;

const INDEX: &str = "index_for_search";

/// Twelve documents: `id` i, `timestamp` 2009-01-01 10:(5*i), `data_int` 10*i
fn point_store() -> FakeSearch {
    let mut store = FakeSearch::new();
    for i in 0..12u32 {
        let timestamp = NaiveDate::from_ymd_opt(2009, 1, 1)
            .and_then(|date| date.and_hms_opt(10, 5 * i, 0))
            .unwrap();
        let source = BTreeMap::from([
            ("id".to_string(), Value::from(i as i64)),
            ("timestamp".to_string(), Value::from(timestamp)),
            ("data_int".to_string(), Value::from(10 * i as i64)),
        ]);
        store.index(INDEX, Value::from(source), None).unwrap();
    }
    store
}

/// Two documents whose `data_int` is `[0,5]` and `[10,15]`
fn interval_store() -> FakeSearch {
    let mut store = FakeSearch::new();
    for i in 0..2 {
        store
            .index(
                INDEX,
                json!({"id": i, "data_int": {"gte": 10 * i, "lte": 10 * i + 5}}),
                None,
            )
            .unwrap();
    }
    store
}

fn search_range(store: &mut FakeSearch, range: JsonValue) -> SearchResponse {
    store
        .search(
            Some(&json!({"query": {"range": range}})),
            INDEX,
            &RequestParams::default(),
        )
        .unwrap()
}

fn id_set(response: &SearchResponse) -> BTreeSet<i64> {
    response
        .sources()
        .iter()
        .filter_map(|source| source.get("id").and_then(Value::as_i64))
        .collect()
}

// =============================================================================
// Point Ranges
// =============================================================================

/// Test: Single and combined bounds over integers.
#[test]
fn test_integer_ranges() {
    let cases = [
        (json!({"data_int": {"gt": 40}}), 5..12),
        (json!({"data_int": {"gte": 40}}), 4..12),
        (json!({"data_int": {"lt": 70}}), 0..7),
        (json!({"data_int": {"lte": 70}}), 0..8),
        (json!({"data_int": {"gt": 30, "lte": 70}}), 4..8),
    ];

    let mut store = point_store();
    for (range, expected) in cases {
        let response = search_range(&mut store, range.clone());
        let expected: BTreeSet<i64> = expected.collect();
        assert_eq!(response.total(), expected.len(), "range {}", range);
        assert_eq!(id_set(&response), expected, "range {}", range);
    }
}

/// Test: ISO-8601 bounds compare against timestamp values.
#[test]
fn test_timestamp_ranges() {
    let cases = [
        (json!({"timestamp": {"gt": "2009-01-01T10:20:00"}}), 5..12),
        (json!({"timestamp": {"gte": "2009-01-01T10:20:00"}}), 4..12),
        (json!({"timestamp": {"lt": "2009-01-01T10:35:00"}}), 0..7),
        (json!({"timestamp": {"lte": "2009-01-01T10:35:00"}}), 0..8),
        (
            json!({"timestamp": {"gt": "2009-01-01T10:15:00", "lte": "2009-01-01T10:35:00"}}),
            4..8,
        ),
    ];

    let mut store = point_store();
    for (range, expected) in cases {
        let response = search_range(&mut store, range.clone());
        assert_eq!(id_set(&response), expected.collect::<BTreeSet<i64>>(), "range {}", range);
    }
}

/// Test: Timestamps are returned as ISO-8601 text.
#[test]
fn test_timestamp_hits_serialize_as_text() {
    let mut store = point_store();
    let response = search_range(&mut store, json!({"data_int": {"lte": 0}}));

    let body = serde_json::to_value(&response).unwrap();
    assert_eq!(
        body["hits"]["hits"][0]["_source"]["timestamp"],
        json!("2009-01-01T10:00:00")
    );
}

/// Test: Comparing numbers with strings is a validation error.
#[test]
fn test_incomparable_bound_is_rejected() {
    let mut store = point_store();
    let err = store
        .search(
            Some(&json!({"query": {"range": {"data_int": {"gt": "forty"}}}})),
            INDEX,
            &RequestParams::default(),
        )
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
}

// =============================================================================
// Interval Relations
// =============================================================================

/// Test: intersects, within and contains against stored intervals.
#[test]
fn test_range_relations() {
    let cases: [(JsonValue, [&[i64]; 3]); 7] = [
        // [intersects, within, contains]
        (json!({"gt": 100, "lt": 200}), [&[], &[], &[]]),
        (json!({"gt": 1, "lt": 3}), [&[0], &[], &[0]]),
        (json!({"gt": 5, "lt": 10}), [&[], &[], &[]]),
        (json!({"gt": 5, "lte": 10}), [&[1], &[], &[]]),
        (json!({"gt": 3, "lt": 6}), [&[0], &[], &[]]),
        (json!({"gte": 0, "lte": 25}), [&[0, 1], &[0, 1], &[]]),
        (json!({"gt": 0, "lt": 25}), [&[0, 1], &[1], &[]]),
    ];

    let mut store = interval_store();
    for (bounds, expected) in cases {
        for (relation, ids) in ["intersects", "within", "contains"].iter().zip(expected) {
            let mut range = bounds.clone();
            range["relation"] = json!(relation);

            let response = search_range(&mut store, json!({ "data_int": range }));
            let expected: BTreeSet<i64> = ids.iter().copied().collect();
            assert_eq!(
                id_set(&response),
                expected,
                "relation {} on {}",
                relation,
                bounds
            );
        }
    }
}

/// Test: Relation defaults to intersects.
#[test]
fn test_relation_defaults_to_intersects() {
    let mut store = interval_store();
    let response = search_range(&mut store, json!({"data_int": {"gt": 3, "lt": 12}}));
    assert_eq!(id_set(&response), BTreeSet::from([0, 1]));
}
