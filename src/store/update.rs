//! Update-by-query with simple assignment scripts

use std::collections::BTreeMap;

use regex::Regex;
use serde_json::Value as JsonValue;

use super::errors::{StoreError, StoreResult};
use super::params::RequestParams;
use super::response::UpdateByQueryResponse;
use super::fake::FakeSearch;
use crate::observability::{log_event_with_fields, Event};
use crate::value::Value;

const ASSIGNMENT_PATTERN: &str = r"^\s*ctx\._source\.([A-Za-z0-9_.]+)\s*=\s*(.+?)\s*$";

/// One `ctx._source.<path> = <value>` statement
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub path: Vec<String>,
    pub value: Value,
}

impl Assignment {
    fn apply(&self, source: &mut Value) {
        let Some((last, parents)) = self.path.split_last() else {
            return;
        };

        let mut target = source;
        for segment in parents {
            if target.as_object().is_none() {
                *target = Value::object();
            }
            let Some(members) = target.as_object_mut() else {
                return;
            };
            target = members.entry(segment.clone()).or_insert_with(Value::object);
        }

        if target.as_object().is_none() {
            *target = Value::object();
        }
        if let Some(members) = target.as_object_mut() {
            members.insert(last.clone(), self.value.clone());
        }
    }
}

/// Parses a `;`-separated assignment script.
///
/// Right-hand sides are `params.<name>`, a JSON literal, a single-quoted
/// string, or else kept as raw text.
pub fn parse_script(source: &str, params: &BTreeMap<String, Value>) -> StoreResult<Vec<Assignment>> {
    let pattern = Regex::new(ASSIGNMENT_PATTERN)
        .map_err(|err| StoreError::NotImplemented(format!("script parser unavailable: {}", err)))?;

    source
        .split(';')
        .filter(|statement| !statement.trim().is_empty())
        .map(|statement| {
            let captures = pattern.captures(statement).ok_or_else(|| {
                StoreError::NotImplemented(format!(
                    "Only 'ctx._source.<field> = <value>' statements are supported, got '{}'",
                    statement.trim()
                ))
            })?;
            Ok(Assignment {
                path: captures[1].split('.').map(str::to_string).collect(),
                value: literal(&captures[2], params),
            })
        })
        .collect()
}

fn literal(text: &str, params: &BTreeMap<String, Value>) -> Value {
    if let Some(name) = text.strip_prefix("params.") {
        return params.get(name).cloned().unwrap_or_default();
    }
    if let Ok(json) = serde_json::from_str::<JsonValue>(text) {
        return Value::from(json);
    }
    match text.strip_prefix('\'').and_then(|rest| rest.strip_suffix('\'')) {
        Some(quoted) => Value::from(quoted),
        None => Value::from(text),
    }
}

impl FakeSearch {
    /// Applies an assignment script to every document matching `body.query`
    pub fn update_by_query(
        &mut self,
        index: &str,
        body: &JsonValue,
    ) -> StoreResult<UpdateByQueryResponse> {
        self.available()?;
        let script = body
            .get("script")
            .ok_or_else(|| StoreError::validation("Validation Failed: 1: script is missing;"))?;
        let source = script
            .get("source")
            .or_else(|| script.get("inline"))
            .and_then(JsonValue::as_str)
            .ok_or_else(|| StoreError::validation("script requires 'source'"))?;
        let params: BTreeMap<String, Value> = match script.get("params") {
            Some(JsonValue::Object(params)) => params
                .iter()
                .map(|(name, value)| (name.clone(), Value::from(value)))
                .collect(),
            _ => BTreeMap::new(),
        };
        let assignments = parse_script(source, &params)?;

        let matches = self.search(Some(body), index, &RequestParams::default())?;
        let total = matches.total();

        let mut updated = 0;
        for hit in matches.hits.hits {
            let document = hit.document;
            let mut source = document.source;
            for assignment in &assignments {
                assignment.apply(&mut source);
            }
            self.put(&document.index, &document.id, &document.doc_type, source);
            updated += 1;
        }

        log_event_with_fields(
            Event::DocumentUpdated,
            &[("index", index), ("updated", &updated.to_string())],
        );

        Ok(UpdateByQueryResponse {
            took: 1,
            timed_out: false,
            total,
            updated,
            deleted: 0,
            batches: 1,
            version_conflicts: 0,
            noops: 0,
            retries: 0,
            throttled_millis: 100,
            requests_per_second: 100,
            throttled_until_millis: 0,
            failures: Vec::new(),
        })
    }
}
