//! Condition evaluation
//!
//! Evaluation is a pure function of a condition and a document source.
//! Compound nodes short-circuit, and the first error aborts the whole tree.

use super::condition::{Condition, RangeClause};
use super::errors::QueryResult;
use super::matcher::{field_exists, field_matches};
use super::range::{bounds_of, build_range, compare_ranges, point_satisfies};
use crate::value::{resolve_path, Value};

/// Evaluates `condition` against a document source
pub fn evaluate(condition: &Condition, source: &Value) -> QueryResult<bool> {
    match condition {
        Condition::MatchAll | Condition::Threshold(_) => Ok(true),
        Condition::Match(clauses) => Ok(clauses
            .iter()
            .any(|clause| field_matches(source, &clause.field, &clause.value, true))),
        Condition::Term(clauses) => Ok(clauses
            .iter()
            .any(|clause| field_matches(source, &clause.field, &clause.value, false))),
        Condition::Terms(clauses) => Ok(clauses.iter().any(|clause| {
            clause
                .values
                .iter()
                .any(|value| field_matches(source, &clause.field, value, false))
        })),
        Condition::Range(clauses) => {
            if clauses.is_empty() {
                return Ok(false);
            }
            for clause in clauses {
                if !evaluate_range(clause, source)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Condition::MultiMatch(clause) => {
            let Some(query) = clause.query.as_ref().filter(|query| !is_blank(query)) else {
                return Ok(false);
            };
            Ok(clause
                .fields
                .iter()
                .any(|field| field_matches(source, field, query, true)))
        }
        Condition::Exists(field) => Ok(field_exists(source, field)),
        Condition::All(children) => {
            if children.is_empty() {
                return Ok(false);
            }
            for child in children {
                if !evaluate(child, source)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Condition::Any(children) => {
            for child in children {
                if evaluate(child, source)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Condition::NoneOf(children) => {
            for child in children {
                if evaluate(child, source)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
    }
}

fn evaluate_range(clause: &RangeClause, source: &Value) -> QueryResult<bool> {
    let Some(found) = resolve_path(source, &clause.field) else {
        return Ok(false);
    };

    match found.as_ref() {
        Value::Null | Value::Array(_) => Ok(false),
        Value::Object(map) => {
            let document = build_range(bounds_of(map))?;
            let query = build_range(clause.comparisons.iter().map(|(op, bound)| (*op, bound)))?;
            compare_ranges(&document, &query, clause.relation)
        }
        point => point_satisfies(&clause.comparisons, point),
    }
}

fn is_blank(query: &Value) -> bool {
    match query {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Int(n) => *n == 0,
        Value::Float(f) => *f == 0.0,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Timestamp(_) => false,
    }
}
