//! Search, scroll, count, msearch, suggest and point-in-time

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::Utc;
use serde_json::Value as JsonValue;

use super::document::Document;
use super::errors::{StoreError, StoreResult};
use super::ids::{random_pit_id, random_scroll_id};
use super::params::{IndexTarget, RequestParams};
use super::response::{
    AggregationResult, CountResponse, Hit, Hits, MsearchResponse, PitResponse, SearchResponse,
    Shards, SuggestEntry, SuggestOption, SuggestResponse, TotalHits,
};
use super::fake::FakeSearch;
use crate::aggregation::AggregationSpec;
use crate::observability::{log_event_with_fields, Event};
use crate::query::Query;
use crate::value::{resolve_path, Value};

/// Page size of a scroll cursor when the request sets none
pub const DEFAULT_SCROLL_SIZE: usize = 10;

/// One `sort` key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortClause {
    pub field: String,
    pub descending: bool,
}

/// A decoded search body
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchBody {
    pub query: Option<Query>,
    pub aggregations: Vec<(String, AggregationSpec)>,
    pub sort: Vec<SortClause>,
    pub from: Option<usize>,
    pub size: Option<usize>,
}

impl SearchBody {
    pub fn parse(body: Option<&JsonValue>) -> StoreResult<Self> {
        let Some(body) = body.filter(|body| !body.is_null()) else {
            return Ok(Self::default());
        };
        let map = body
            .as_object()
            .ok_or_else(|| StoreError::validation("search body must be an object"))?;

        let query = map.get("query").map(Query::from_body).transpose()?;

        let mut aggregations = Vec::new();
        if let Some(named) = map.get("aggs").or_else(|| map.get("aggregations")) {
            let named = named
                .as_object()
                .ok_or_else(|| StoreError::validation("aggregations must be an object"))?;
            for (name, definition) in named {
                aggregations.push((name.clone(), AggregationSpec::parse(definition)?));
            }
        }

        let sort = match map.get("sort") {
            None => Vec::new(),
            Some(JsonValue::Array(items)) => items
                .iter()
                .map(parse_sort)
                .collect::<StoreResult<Vec<_>>>()?
                .into_iter()
                .flatten()
                .collect(),
            Some(single) => parse_sort(single)?,
        };

        Ok(Self {
            query,
            aggregations,
            sort,
            from: usize_field(map.get("from"), "from")?,
            size: usize_field(map.get("size"), "size")?,
        })
    }
}

fn usize_field(value: Option<&JsonValue>, name: &str) -> StoreResult<Option<usize>> {
    match value {
        None | Some(JsonValue::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| StoreError::validation(format!("'{}' must be a non-negative integer", name))),
    }
}

/// Accepts `"field"`, `{"field": "desc"}` and `{"field": {"order": "desc"}}`
fn parse_sort(entry: &JsonValue) -> StoreResult<Vec<SortClause>> {
    match entry {
        JsonValue::String(field) => Ok(vec![SortClause {
            field: field.clone(),
            descending: false,
        }]),
        JsonValue::Object(map) => map
            .iter()
            .map(|(field, order)| {
                let order = match order {
                    JsonValue::String(order) => order.as_str(),
                    JsonValue::Object(options) => options
                        .get("order")
                        .and_then(JsonValue::as_str)
                        .unwrap_or("asc"),
                    _ => "asc",
                };
                Ok(SortClause {
                    field: field.clone(),
                    descending: order.eq_ignore_ascii_case("desc"),
                })
            })
            .collect(),
        other => Err(StoreError::validation(format!("invalid sort entry {}", other))),
    }
}

/// A stored scroll cursor
#[derive(Debug, Clone)]
pub struct ScrollState {
    target: IndexTarget,
    body: SearchBody,
    size: usize,
    next_from: usize,
}

/// Every match of a search, before pagination
struct Evaluation {
    searched: usize,
    matches: Vec<Document>,
    aggregations: Option<BTreeMap<String, AggregationResult>>,
}

impl FakeSearch {
    /// Runs a search over `index`.
    ///
    /// With a `scroll` param the first page is returned and a cursor is
    /// opened for the rest.
    pub fn search(
        &mut self,
        body: Option<&JsonValue>,
        index: impl Into<IndexTarget>,
        params: &RequestParams,
    ) -> StoreResult<SearchResponse> {
        self.available()?;
        let target = index.into();
        let body = SearchBody::parse(body).inspect_err(|err| self.reject(err))?;
        let evaluation = self.evaluate(&target, &body).inspect_err(|err| self.reject(err))?;

        if params.scroll.is_some() {
            let size = params.size.unwrap_or(DEFAULT_SCROLL_SIZE);
            let from = params.from.unwrap_or(0);
            let scroll_id = self.open_scroll(ScrollState {
                target,
                body,
                size,
                next_from: from.saturating_add(size),
            });
            return Ok(respond(evaluation, from, Some(size), Some(scroll_id)));
        }

        let (from, size) = match params.size {
            Some(size) => (params.from.unwrap_or(0), Some(size)),
            None => (body.from.unwrap_or(0), body.size),
        };
        Ok(respond(evaluation, from, size, None))
    }

    /// Returns the next page of a scroll cursor and re-opens it under a new id
    pub fn scroll(&mut self, scroll_id: &str) -> StoreResult<SearchResponse> {
        self.available()?;
        let state = self
            .scrolls
            .remove(scroll_id)
            .ok_or_else(|| StoreError::ScrollNotFound(scroll_id.to_string()))?;

        let evaluation = self.evaluate(&state.target, &state.body)?;
        let (from, size) = (state.next_from, state.size);
        let next_id = self.open_scroll(ScrollState {
            next_from: from.saturating_add(size),
            ..state
        });

        log_event_with_fields(Event::ScrollAdvanced, &[("from", &from.to_string())]);
        Ok(respond(evaluation, from, Some(size), Some(next_id)))
    }

    /// Drops a scroll cursor; returns whether it existed
    pub fn clear_scroll(&mut self, scroll_id: &str) -> StoreResult<bool> {
        self.available()?;
        Ok(self.scrolls.remove(scroll_id).is_some())
    }

    /// Number of documents matching `body`
    pub fn count(
        &mut self,
        body: Option<&JsonValue>,
        index: impl Into<IndexTarget>,
    ) -> StoreResult<CountResponse> {
        self.available()?;
        let body = SearchBody::parse(body)?;
        let evaluation = self.evaluate(&index.into(), &body)?;
        Ok(CountResponse {
            count: evaluation.matches.len(),
            shards: Shards::of(evaluation.searched),
        })
    }

    /// Runs header/body pairs; a header's `index` selects the target
    pub fn msearch(&mut self, body: &[JsonValue]) -> StoreResult<MsearchResponse> {
        self.available()?;
        if body.len() % 2 != 0 {
            return Err(StoreError::validation("Malformed body"));
        }

        let mut took = 0;
        let mut responses = Vec::with_capacity(body.len() / 2);
        for pair in body.chunks(2) {
            let target = IndexTarget::from_json(pair[0].get("index"))?;
            let response = self.search(Some(&pair[1]), target, &RequestParams::default())?;
            took += response.took;
            responses.push(response);
        }

        Ok(MsearchResponse { took, responses })
    }

    /// Echo suggester: `<text>_suggestion`, or `n + 1` for integer texts
    pub fn suggest(&self, body: &JsonValue, index: Option<&str>) -> StoreResult<SuggestResponse> {
        self.available()?;
        if let Some(index) = index {
            if !self.indices.contains_key(index) {
                return Err(StoreError::IndexNotFound(index.to_string()));
            }
        }
        let requests = body
            .as_object()
            .ok_or_else(|| StoreError::validation("suggest body must be an object"))?;

        let mut suggestions = SuggestResponse::new();
        for (name, request) in requests {
            let text = request.get("text").map(Value::from).unwrap_or_default();
            let suggestion = match &text {
                Value::Int(n) => Value::Int(n + 1),
                other => Value::String(format!("{}_suggestion", other.to_text())),
            };
            suggestions.insert(
                name.clone(),
                vec![SuggestEntry {
                    text,
                    length: 1,
                    options: vec![SuggestOption {
                        text: suggestion,
                        freq: 1,
                        score: 1.0,
                    }],
                    offset: 0,
                }],
            );
        }
        Ok(suggestions)
    }

    /// Opens a point-in-time handle
    pub fn create_pit(&self, index: &str) -> StoreResult<PitResponse> {
        self.available()?;
        if index.is_empty() {
            return Err(StoreError::validation(
                "Empty value passed for a required argument 'index'.",
            ));
        }
        Ok(PitResponse {
            pit_id: random_pit_id(),
            shards: Shards::of(1),
            creation_time: Utc::now().timestamp_millis(),
        })
    }

    // ==================
    // Internals
    // ==================

    fn reject(&self, err: &StoreError) {
        self.metrics.increment_searches_rejected();
        log_event_with_fields(Event::SearchRejected, &[("error", &err.to_string())]);
    }

    fn open_scroll(&mut self, state: ScrollState) -> String {
        let scroll_id = random_scroll_id();
        self.scrolls.insert(scroll_id.clone(), state);
        self.metrics.increment_scrolls_opened();
        scroll_id
    }

    fn resolve(&self, target: &IndexTarget) -> StoreResult<Vec<&str>> {
        match target {
            IndexTarget::All => Ok(self.indices.keys().map(String::as_str).collect()),
            IndexTarget::Named(names) => names
                .iter()
                .map(|name| {
                    self.indices
                        .get_key_value(name)
                        .map(|(key, _)| key.as_str())
                        .ok_or_else(|| StoreError::IndexNotFound(name.clone()))
                })
                .collect(),
        }
    }

    fn evaluate(&self, target: &IndexTarget, body: &SearchBody) -> StoreResult<Evaluation> {
        let indices = self.resolve(target)?;

        let mut matches = Vec::new();
        for index in &indices {
            for document in self.indices.get(*index).into_iter().flatten() {
                let matched = match &body.query {
                    Some(query) => query.matches(&document.source)?,
                    None => true,
                };
                if matched {
                    matches.push(document.clone());
                }
            }
        }

        let aggregations = if body.aggregations.is_empty() {
            None
        } else {
            let sources: Vec<&Value> = matches.iter().map(|doc| &doc.source).collect();
            Some(
                body.aggregations
                    .iter()
                    .map(|(name, spec)| (name.clone(), aggregate(spec, &sources)))
                    .collect(),
            )
        };

        if !body.sort.is_empty() {
            matches.sort_by(|a, b| compare_by(&body.sort, a, b));
        }

        self.metrics.increment_searches_executed();
        log_event_with_fields(
            Event::SearchExecuted,
            &[
                ("hits", &matches.len().to_string()),
                ("indices", &indices.join(",")),
            ],
        );

        Ok(Evaluation {
            searched: indices.len(),
            matches,
            aggregations,
        })
    }
}

fn aggregate(spec: &AggregationSpec, sources: &[&Value]) -> AggregationResult {
    let (buckets, after_key) = match spec {
        AggregationSpec::Composite(composite) => {
            let page = composite.page(composite.bucket(sources.iter().copied()));
            (page.buckets, page.after_key)
        }
        AggregationSpec::Unsupported(_) => (Vec::new(), None),
    };
    AggregationResult {
        doc_count_error_upper_bound: 0,
        sum_other_doc_count: 0,
        buckets,
        after_key,
    }
}

fn compare_by(sort: &[SortClause], a: &Document, b: &Document) -> Ordering {
    for clause in sort {
        let left = resolve_path(&a.source, &clause.field).map(|v| v.into_owned());
        let right = resolve_path(&b.source, &clause.field).map(|v| v.into_owned());
        let ord = left.unwrap_or_default().cmp(&right.unwrap_or_default());
        let ord = if clause.descending { ord.reverse() } else { ord };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

fn respond(
    evaluation: Evaluation,
    from: usize,
    size: Option<usize>,
    scroll_id: Option<String>,
) -> SearchResponse {
    let total = evaluation.matches.len();
    let hits = evaluation
        .matches
        .into_iter()
        .skip(from)
        .take(size.unwrap_or(usize::MAX))
        .map(|document| Hit {
            document,
            score: 1.0,
        })
        .collect();

    SearchResponse {
        took: 1,
        timed_out: false,
        shards: Shards::of(evaluation.searched),
        hits: Hits {
            total: TotalHits {
                value: total,
                relation: "eq",
            },
            max_score: 1.0,
            hits,
        },
        aggregations: evaluation.aggregations,
        scroll_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seeded() -> FakeSearch {
        let mut store = FakeSearch::new();
        for i in 0..5 {
            store
                .index("people", json!({"n": i, "name": format!("user_{}", i)}), Some(&i.to_string()))
                .unwrap();
        }
        store
    }

    #[test]
    fn test_search_body_parse() {
        let body = SearchBody::parse(Some(&json!({
            "query": {"match_all": {}},
            "sort": [{"n": {"order": "desc"}}, "name"],
            "from": 2,
            "size": 3
        })))
        .unwrap();

        assert!(body.query.is_some());
        assert_eq!(
            body.sort,
            vec![
                SortClause {
                    field: "n".into(),
                    descending: true
                },
                SortClause {
                    field: "name".into(),
                    descending: false
                },
            ]
        );
        assert_eq!(body.from, Some(2));
        assert_eq!(body.size, Some(3));
    }

    #[test]
    fn test_sort_descending() {
        let mut store = seeded();
        let response = store
            .search(
                Some(&json!({"sort": [{"n": {"order": "desc"}}]})),
                "people",
                &RequestParams::default(),
            )
            .unwrap();
        assert_eq!(response.ids(), vec!["4", "3", "2", "1", "0"]);
    }

    #[test]
    fn test_from_and_size() {
        let mut store = seeded();
        let response = store
            .search(Some(&json!({"from": 1, "size": 2})), "people", &RequestParams::default())
            .unwrap();
        assert_eq!(response.ids(), vec!["1", "2"]);
        assert_eq!(response.total(), 5);
    }

    #[test]
    fn test_size_param_overrides_body() {
        let mut store = seeded();
        let response = store
            .search(
                Some(&json!({"size": 4})),
                "people",
                &RequestParams::new().with_size(1),
            )
            .unwrap();
        assert_eq!(response.ids(), vec!["0"]);
    }

    #[test]
    fn test_scroll_with_huge_size_does_not_overflow() {
        let mut store = seeded();
        let params = RequestParams::new()
            .with_scroll("1m")
            .with_from(1)
            .with_size(usize::MAX);
        let first = store.search(None, "people", &params).unwrap();
        assert_eq!(first.ids(), vec!["1", "2", "3", "4"]);

        let scroll_id = first.scroll_id.unwrap();
        let next = store.scroll(&scroll_id).unwrap();
        assert!(next.ids().is_empty());
        assert_eq!(next.total(), 5);

        let again = store.scroll(next.scroll_id.as_deref().unwrap()).unwrap();
        assert!(again.ids().is_empty());
    }

    #[test]
    fn test_unknown_index() {
        let mut store = seeded();
        let err = store
            .search(None, "missing", &RequestParams::default())
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_rejected_search_is_counted() {
        let mut store = seeded();
        let err = store
            .search(Some(&json!({"query": {"fuzzy": {}}})), "people", &RequestParams::default())
            .unwrap_err();
        assert_eq!(err.status_code(), 501);
        assert_eq!(store.metrics().snapshot().searches_rejected, 1);
    }

    #[test]
    fn test_suggest() {
        let mut store = seeded();
        store.indices().create("suggestions").unwrap();
        let response = store
            .suggest(
                &json!({
                    "s": {"text": "test_text", "term": {"field": "string"}},
                    "i": {"text": 1234567, "term": {"field": "id"}}
                }),
                Some("suggestions"),
            )
            .unwrap();

        assert_eq!(response["s"][0].options[0].text, Value::from("test_text_suggestion"));
        assert_eq!(response["i"][0].options[0].text, Value::Int(1234568));
        assert!(store.suggest(&json!({}), Some("nope")).is_err());
    }

    #[test]
    fn test_create_pit() {
        let store = FakeSearch::new();
        assert_eq!(store.create_pit("logs").unwrap().pit_id.len(), 168);
        assert!(store.create_pit("").is_err());
    }
}
