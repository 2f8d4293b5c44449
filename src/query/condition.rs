//! Typed query condition tree
//!
//! The wire form is a single-key mapping `{tag: payload}`. Parsing validates
//! the tag against the closed vocabulary and decodes each payload eagerly,
//! so evaluation never sees a malformed leaf.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value as JsonValue};

use super::errors::{QueryError, QueryResult};
use super::range::{CompareOp, Relation};
use crate::observability::{log_event_with_fields, Event};
use crate::value::Value;

/// Tag vocabulary of the query language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryTag {
    Bool,
    Filter,
    Must,
    Should,
    MustNot,
    MinimumShouldMatch,
    Match,
    MatchAll,
    Term,
    Terms,
    Range,
    MultiMatch,
    Exists,
}

impl QueryTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryTag::Bool => "bool",
            QueryTag::Filter => "filter",
            QueryTag::Must => "must",
            QueryTag::Should => "should",
            QueryTag::MustNot => "must_not",
            QueryTag::MinimumShouldMatch => "minimum_should_match",
            QueryTag::Match => "match",
            QueryTag::MatchAll => "match_all",
            QueryTag::Term => "term",
            QueryTag::Terms => "terms",
            QueryTag::Range => "range",
            QueryTag::MultiMatch => "multi_match",
            QueryTag::Exists => "exists",
        }
    }
}

impl FromStr for QueryTag {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "bool" => QueryTag::Bool,
            "filter" => QueryTag::Filter,
            "must" => QueryTag::Must,
            "should" => QueryTag::Should,
            "must_not" => QueryTag::MustNot,
            "minimum_should_match" => QueryTag::MinimumShouldMatch,
            "match" => QueryTag::Match,
            "match_all" => QueryTag::MatchAll,
            "term" => QueryTag::Term,
            "terms" => QueryTag::Terms,
            "range" => QueryTag::Range,
            "multi_match" => QueryTag::MultiMatch,
            "exists" => QueryTag::Exists,
            other => {
                return Err(QueryError::not_implemented(format!(
                    "Fake query evaluation not implemented for query type: {}",
                    other
                )))
            }
        })
    }
}

impl fmt::Display for QueryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A `field: value` pair of a match or term leaf
#[derive(Debug, Clone, PartialEq)]
pub struct FieldClause {
    pub field: String,
    pub value: Value,
}

/// A `field: [values]` pair of a terms leaf
#[derive(Debug, Clone, PartialEq)]
pub struct TermsClause {
    pub field: String,
    pub values: Vec<Value>,
}

/// One field of a range leaf
#[derive(Debug, Clone, PartialEq)]
pub struct RangeClause {
    pub field: String,
    pub comparisons: Vec<(CompareOp, Value)>,
    pub relation: Relation,
}

/// Payload of a multi_match leaf
#[derive(Debug, Clone, PartialEq)]
pub struct MultiMatchClause {
    pub query: Option<Value>,
    pub fields: Vec<String>,
}

/// A parsed query node
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    MatchAll,
    /// Case-insensitive partial match, OR across fields
    Match(Vec<FieldClause>),
    /// Case-sensitive match, OR across fields
    Term(Vec<FieldClause>),
    Terms(Vec<TermsClause>),
    /// Conjunction across fields
    Range(Vec<RangeClause>),
    MultiMatch(MultiMatchClause),
    Exists(String),
    /// `bool`, `filter`, `must` and structured `minimum_should_match`
    All(Vec<Condition>),
    /// `should`
    Any(Vec<Condition>),
    /// `must_not`
    NoneOf(Vec<Condition>),
    /// Scalar `minimum_should_match`; always holds
    Threshold(Value),
}

impl Condition {
    /// Parses a single-key wire mapping `{tag: payload}`
    pub fn from_json(tree: &JsonValue) -> QueryResult<Self> {
        let map = expect_object(tree, "query condition")?;
        if map.len() != 1 {
            return Err(QueryError::validation(format!(
                "A query condition must have exactly one tag, found {}",
                map.len()
            )));
        }
        match map.iter().next() {
            Some((tag, payload)) => Condition::parse(tag, payload),
            None => Err(QueryError::validation("Empty query condition")),
        }
    }

    /// Parses the payload of `tag`
    pub fn parse(tag: &str, payload: &JsonValue) -> QueryResult<Self> {
        let tag: QueryTag = tag.parse()?;

        match tag {
            QueryTag::MatchAll => Ok(Condition::MatchAll),
            QueryTag::Match => Ok(Condition::Match(field_clauses(tag, payload)?)),
            QueryTag::Term => Ok(Condition::Term(field_clauses(tag, payload)?)),
            QueryTag::Terms => parse_terms(payload),
            QueryTag::Range => parse_range(payload),
            QueryTag::MultiMatch => parse_multi_match(payload),
            QueryTag::Exists => {
                let map = expect_object(payload, "exists")?;
                match map.get("field").and_then(JsonValue::as_str) {
                    Some(field) => Ok(Condition::Exists(field.to_string())),
                    None => Err(QueryError::validation(
                        "exists query requires a string 'field'",
                    )),
                }
            }
            QueryTag::Bool | QueryTag::Filter | QueryTag::Must => {
                Ok(Condition::All(parse_children(tag, payload)?))
            }
            QueryTag::Should => Ok(Condition::Any(parse_children(tag, payload)?)),
            QueryTag::MustNot => Ok(Condition::NoneOf(parse_children(tag, payload)?)),
            QueryTag::MinimumShouldMatch => match payload {
                JsonValue::Object(_) | JsonValue::Array(_) => {
                    Ok(Condition::All(parse_children(tag, payload)?))
                }
                scalar => Ok(Condition::Threshold(Value::from(scalar))),
            },
        }
    }
}

fn expect_object<'a>(payload: &'a JsonValue, what: &str) -> QueryResult<&'a Map<String, JsonValue>> {
    payload.as_object().ok_or_else(|| {
        QueryError::validation(format!("{} expects an object, got {}", what, payload))
    })
}

fn field_clauses(tag: QueryTag, payload: &JsonValue) -> QueryResult<Vec<FieldClause>> {
    let map = expect_object(payload, tag.as_str())?;
    Ok(map
        .iter()
        .map(|(field, value)| FieldClause {
            field: field.clone(),
            value: Value::from(value),
        })
        .collect())
}

fn parse_terms(payload: &JsonValue) -> QueryResult<Condition> {
    let map = expect_object(payload, "terms")?;
    let mut clauses = Vec::with_capacity(map.len());

    for (field, values) in map {
        let values = values.as_array().ok_or_else(|| {
            QueryError::validation(format!("terms query on '{}' expects a list", field))
        })?;
        clauses.push(TermsClause {
            field: field.clone(),
            values: values.iter().map(Value::from).collect(),
        });
    }

    Ok(Condition::Terms(clauses))
}

fn parse_range(payload: &JsonValue) -> QueryResult<Condition> {
    let map = expect_object(payload, "range")?;
    let mut clauses = Vec::with_capacity(map.len());

    for (field, spec) in map {
        let spec = expect_object(spec, "range field")?;
        let mut comparisons = Vec::new();
        let mut relation = Relation::default();

        for (key, bound) in spec {
            if key == "relation" {
                let name = bound.as_str().unwrap_or_default();
                relation = match Relation::parse(name) {
                    Some(relation) => relation,
                    None => {
                        log_event_with_fields(
                            Event::QueryRelationDefaulted,
                            &[("field", field.as_str()), ("relation", &bound.to_string())],
                        );
                        Relation::Intersects
                    }
                };
                continue;
            }
            let op: CompareOp = key.parse()?;
            comparisons.push((op, Value::from(bound)));
        }

        clauses.push(RangeClause {
            field: field.clone(),
            comparisons,
            relation,
        });
    }

    Ok(Condition::Range(clauses))
}

fn parse_multi_match(payload: &JsonValue) -> QueryResult<Condition> {
    let map = expect_object(payload, "multi_match")?;

    let query = map.get("query").map(Value::from);
    let fields = match map.get("fields") {
        None => Vec::new(),
        Some(JsonValue::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    QueryError::validation(format!("multi_match field {} is not a string", item))
                })
            })
            .collect::<QueryResult<Vec<_>>>()?,
        Some(other) => {
            return Err(QueryError::validation(format!(
                "multi_match 'fields' expects a list, got {}",
                other
            )))
        }
    };

    Ok(Condition::MultiMatch(MultiMatchClause { query, fields }))
}

/// Decodes a compound payload: `{tag: payload, ...}` or `[{tag: payload}, ...]`
fn parse_children(tag: QueryTag, payload: &JsonValue) -> QueryResult<Vec<Condition>> {
    match payload {
        JsonValue::Object(map) => map
            .iter()
            .map(|(child_tag, child)| Condition::parse(child_tag, child))
            .collect(),
        JsonValue::Array(items) => {
            let mut children = Vec::new();
            for item in items {
                let map = expect_object(item, tag.as_str())?;
                for (child_tag, child) in map {
                    children.push(Condition::parse(child_tag, child)?);
                }
            }
            Ok(children)
        }
        other => Err(QueryError::validation(format!(
            "{} expects an object or a list of objects, got {}",
            tag, other
        ))),
    }
}

/// A top-level query: several root conditions, matched with OR
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    roots: Vec<Condition>,
}

impl Query {
    /// Parses the mapping found under a search body's `query` key
    pub fn from_body(query: &JsonValue) -> QueryResult<Self> {
        let map = expect_object(query, "query")?;
        let roots = map
            .iter()
            .map(|(tag, payload)| Condition::parse(tag, payload))
            .collect::<QueryResult<Vec<_>>>()?;
        Ok(Self { roots })
    }

    pub fn roots(&self) -> &[Condition] {
        &self.roots
    }

    /// A query without root conditions matches everything
    pub fn matches(&self, source: &Value) -> QueryResult<bool> {
        if self.roots.is_empty() {
            return Ok(true);
        }
        for root in &self.roots {
            if super::evaluate(root, source)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
