//! Newline-delimited bulk requests

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

use super::document::{id_from_json, merge_source, DEFAULT_DOC_TYPE};
use super::errors::{StoreError, StoreResult};
use super::ids::random_id;
use super::response::{BulkItem, BulkResponse};
use super::fake::FakeSearch;
use crate::observability::{log_event_with_fields, Event};
use crate::value::Value;

/// A bulk action verb
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    Index,
    Create,
    Update,
    Delete,
}

impl BulkAction {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "index" => Some(BulkAction::Index),
            "create" => Some(BulkAction::Create),
            "update" => Some(BulkAction::Update),
            "delete" => Some(BulkAction::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BulkAction::Index => "index",
            BulkAction::Create => "create",
            BulkAction::Update => "update",
            BulkAction::Delete => "delete",
        }
    }

    fn carries_source(&self) -> bool {
        !matches!(self, BulkAction::Delete)
    }
}

/// An action line with its resolved target
#[derive(Debug, Clone)]
struct ActionLine {
    action: BulkAction,
    index: String,
    doc_type: String,
    id: String,
}

/// Outcome of one bulk item before it becomes a [`BulkItem`]
struct Outcome {
    status: u16,
    version: u64,
    result: Result<&'static str, &'static str>,
}

impl FakeSearch {
    /// Applies a newline-delimited bulk body.
    ///
    /// Item failures are reported per item and set `errors`; a malformed
    /// body or a missing `_id` on update/delete fails the whole request.
    pub fn bulk(&mut self, body: &str, index: Option<&str>) -> StoreResult<BulkResponse> {
        self.available()?;

        let mut items = Vec::new();
        let mut pending: Option<ActionLine> = None;

        for raw in body.lines().filter(|line| !line.trim().is_empty()) {
            let line: JsonValue = serde_json::from_str(raw)
                .map_err(|err| StoreError::validation(format!("Malformed body: {}", err)))?;

            if let Some(action) = pending.take() {
                items.push(self.apply(action, Some(Value::from(line))));
                continue;
            }

            let action = parse_action(&line, index)?;
            if action.action.carries_source() {
                pending = Some(action);
            } else {
                items.push(self.apply(action, None));
            }
        }

        if let Some(action) = pending {
            return Err(StoreError::validation(format!(
                "Malformed body: {} action without a source line",
                action.action.as_str()
            )));
        }

        let errors = items
            .iter()
            .any(|item| item.values().any(|item| item.error.is_some()));

        self.metrics.increment_bulk_requests();
        log_event_with_fields(
            Event::BulkProcessed,
            &[("errors", &errors.to_string()), ("items", &items.len().to_string())],
        );

        Ok(BulkResponse {
            took: 1,
            errors,
            items,
        })
    }

    fn apply(&mut self, line: ActionLine, source: Option<Value>) -> BTreeMap<String, BulkItem> {
        let outcome = match line.action {
            BulkAction::Index => self.bulk_write(&line, source, false),
            BulkAction::Create => self.bulk_write(&line, source, true),
            BulkAction::Update => self.bulk_update(&line, source),
            BulkAction::Delete => match self.remove(&line.index, &line.id) {
                Some(removed) => Outcome {
                    status: 200,
                    version: removed.version,
                    result: Ok("deleted"),
                },
                None => Outcome {
                    status: 404,
                    version: 1,
                    result: Err("not_found"),
                },
            },
        };

        let (result, error) = match outcome.result {
            Ok(result) => (Some(result.to_string()), None),
            Err(error) => (None, Some(error.to_string())),
        };
        let item = BulkItem {
            index: line.index,
            doc_type: line.doc_type,
            id: line.id,
            version: outcome.version,
            status: outcome.status,
            result,
            error,
        };
        BTreeMap::from([(line.action.as_str().to_string(), item)])
    }

    fn bulk_write(&mut self, line: &ActionLine, source: Option<Value>, create: bool) -> Outcome {
        self.ensure_index(&line.index);
        if create && self.find(&line.index, &line.id).is_some() {
            return Outcome {
                status: 409,
                version: 1,
                result: Err("version_conflict_engine_exception"),
            };
        }

        let source = source.unwrap_or_default();
        let (version, created) = self.put(&line.index, &line.id, &line.doc_type, source);
        if created {
            Outcome {
                status: 201,
                version,
                result: Ok("created"),
            }
        } else {
            Outcome {
                status: 200,
                version,
                result: Ok("updated"),
            }
        }
    }

    fn bulk_update(&mut self, line: &ActionLine, source: Option<Value>) -> Outcome {
        self.ensure_index(&line.index);
        let Some(existing) = self.find(&line.index, &line.id) else {
            return Outcome {
                status: 404,
                version: 1,
                result: Err("document_missing_exception"),
            };
        };

        let mut merged = existing.source.clone();
        match source {
            Some(Value::Object(mut members)) if members.contains_key("doc") => {
                merge_source(&mut merged, members.remove("doc").unwrap_or_default());
            }
            Some(other) => merged = other,
            None => {}
        }

        let (version, _) = self.put(&line.index, &line.id, &line.doc_type, merged);
        Outcome {
            status: 200,
            version,
            result: Ok("updated"),
        }
    }
}

fn parse_action(line: &JsonValue, default_index: Option<&str>) -> StoreResult<ActionLine> {
    let (name, meta) = line
        .as_object()
        .and_then(|map| map.iter().next())
        .ok_or_else(|| StoreError::validation(format!("Malformed action line {}", line)))?;
    let action = BulkAction::parse(name).ok_or_else(|| {
        StoreError::validation(format!("Malformed action/metadata line, unknown action [{}]", name))
    })?;

    let index = meta
        .get("_index")
        .and_then(JsonValue::as_str)
        .or(default_index)
        .ok_or_else(|| StoreError::validation("Validation Failed: 1: index is missing;"))?;
    let doc_type = meta
        .get("_type")
        .and_then(JsonValue::as_str)
        .unwrap_or(DEFAULT_DOC_TYPE);

    let id = match meta.get("_id").and_then(id_from_json) {
        Some(id) => id,
        None if matches!(action, BulkAction::Update | BulkAction::Delete) => {
            return Err(StoreError::BadRequest {
                error_type: "action_request_validation_exception",
                reason: "missing id".to_string(),
            })
        }
        None => random_id(),
    };

    Ok(ActionLine {
        action,
        index: index.to_string(),
        doc_type: doc_type.to_string(),
        id,
    })
}
