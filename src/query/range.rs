//! Range utilities
//!
//! Bound markers follow bracket notation: `[` for `gte`, `(` for `gt`,
//! `]` for `lte` and `)` for `lt`. When both markers of a class are present
//! the inclusive one wins.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::errors::{QueryError, QueryResult};
use crate::value::Value;

/// Comparison operator of a range bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CompareOp {
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Gt => "gt",
            CompareOp::Gte => "gte",
            CompareOp::Lt => "lt",
            CompareOp::Lte => "lte",
        }
    }

    /// True for the lower-bound class (`gt`, `gte`)
    pub fn is_lower(&self) -> bool {
        matches!(self, CompareOp::Gt | CompareOp::Gte)
    }

    pub fn is_inclusive(&self) -> bool {
        matches!(self, CompareOp::Gte | CompareOp::Lte)
    }
}

impl FromStr for CompareOp {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gt" => Ok(CompareOp::Gt),
            "gte" => Ok(CompareOp::Gte),
            "lt" => Ok(CompareOp::Lt),
            "lte" => Ok(CompareOp::Lte),
            other => Err(QueryError::validation(format!(
                "Invalid comparison type {}",
                other
            ))),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a query interval relates to a document interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Relation {
    #[default]
    Intersects,
    Within,
    Contains,
}

impl Relation {
    /// Parses a relation name; `None` for anything unrecognised
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "intersects" => Some(Relation::Intersects),
            "within" => Some(Relation::Within),
            "contains" => Some(Relation::Contains),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Intersects => "intersects",
            Relation::Within => "within",
            Relation::Contains => "contains",
        }
    }
}

/// One end of an interval
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub value: Value,
    pub inclusive: bool,
}

/// A bounded interval
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    pub lower: Endpoint,
    pub upper: Endpoint,
}

impl Interval {
    /// True when `other` lies entirely inside `self`
    pub fn contains(&self, other: &Interval) -> QueryResult<bool> {
        let lower_ok = match ordering(&self.lower.value, &other.lower.value)? {
            Ordering::Less => true,
            Ordering::Equal => self.lower.inclusive || !other.lower.inclusive,
            Ordering::Greater => false,
        };
        if !lower_ok {
            return Ok(false);
        }

        Ok(match ordering(&self.upper.value, &other.upper.value)? {
            Ordering::Greater => true,
            Ordering::Equal => self.upper.inclusive || !other.upper.inclusive,
            Ordering::Less => false,
        })
    }

    /// True when the two intervals share at least one point
    pub fn intersects(&self, other: &Interval) -> QueryResult<bool> {
        let lower = match ordering(&self.lower.value, &other.lower.value)? {
            Ordering::Greater => self.lower.clone(),
            Ordering::Less => other.lower.clone(),
            Ordering::Equal => Endpoint {
                value: self.lower.value.clone(),
                inclusive: self.lower.inclusive && other.lower.inclusive,
            },
        };
        let upper = match ordering(&self.upper.value, &other.upper.value)? {
            Ordering::Less => self.upper.clone(),
            Ordering::Greater => other.upper.clone(),
            Ordering::Equal => Endpoint {
                value: self.upper.value.clone(),
                inclusive: self.upper.inclusive && other.upper.inclusive,
            },
        };

        Ok(match ordering(&lower.value, &upper.value)? {
            Ordering::Less => true,
            Ordering::Equal => lower.inclusive && upper.inclusive,
            Ordering::Greater => false,
        })
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{},{}{}",
            if self.lower.inclusive { '[' } else { '(' },
            self.lower.value,
            self.upper.value,
            if self.upper.inclusive { ']' } else { ')' },
        )
    }
}

fn ordering(lhs: &Value, rhs: &Value) -> QueryResult<Ordering> {
    lhs.partial_compare(rhs).ok_or_else(|| {
        QueryError::validation(format!(
            "Cannot compare {} '{}' with {} '{}'",
            lhs.kind(),
            lhs,
            rhs.kind(),
            rhs
        ))
    })
}

/// Builds an interval from bound markers.
///
/// At least one marker of each class is required.
pub fn build_range<'a, I>(bounds: I) -> QueryResult<Interval>
where
    I: IntoIterator<Item = (CompareOp, &'a Value)>,
{
    let mut lower: Option<Endpoint> = None;
    let mut upper: Option<Endpoint> = None;

    for (op, value) in bounds {
        let slot = if op.is_lower() { &mut lower } else { &mut upper };
        let replace = match slot {
            Some(existing) => op.is_inclusive() && !existing.inclusive,
            None => true,
        };
        if replace {
            *slot = Some(Endpoint {
                value: value.clone(),
                inclusive: op.is_inclusive(),
            });
        }
    }

    match (lower, upper) {
        (Some(lower), Some(upper)) => Ok(Interval { lower, upper }),
        _ => Err(QueryError::validation(
            "Range queries on maps must contain one of [lt, lte] and one of [gt, gte]",
        )),
    }
}

/// Extracts the bound markers of a range-shaped document value.
///
/// Keys other than the four operators are ignored.
pub fn bounds_of(map: &BTreeMap<String, Value>) -> Vec<(CompareOp, &Value)> {
    map.iter()
        .filter_map(|(key, value)| key.parse::<CompareOp>().ok().map(|op| (op, value)))
        .collect()
}

/// Evaluates `lhs <op> rhs`
pub fn compare_scalar(op: CompareOp, lhs: &Value, rhs: &Value) -> QueryResult<bool> {
    let ord = ordering(lhs, rhs)?;
    Ok(match op {
        CompareOp::Gt => ord == Ordering::Greater,
        CompareOp::Gte => ord != Ordering::Less,
        CompareOp::Lt => ord == Ordering::Less,
        CompareOp::Lte => ord != Ordering::Greater,
    })
}

/// Checks a scalar point against every comparison (conjunction).
///
/// Bounds are parsed as ISO-8601 text when the point is a timestamp.
pub fn point_satisfies(comparisons: &[(CompareOp, Value)], point: &Value) -> QueryResult<bool> {
    for (op, bound) in comparisons {
        let holds = if point.is_timestamp() {
            compare_scalar(*op, point, &parse_timestamp(bound)?)?
        } else {
            compare_scalar(*op, point, bound)?
        };
        if !holds {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Compares a document interval with a query interval under `relation`
pub fn compare_ranges(
    document: &Interval,
    query: &Interval,
    relation: Relation,
) -> QueryResult<bool> {
    match relation {
        Relation::Within => query.contains(document),
        Relation::Contains => document.contains(query),
        Relation::Intersects => document.intersects(query),
    }
}

/// Parses a range bound into a timestamp value
pub fn parse_timestamp(bound: &Value) -> QueryResult<Value> {
    let text = match bound {
        Value::Timestamp(_) => return Ok(bound.clone()),
        Value::String(text) => text.trim(),
        other => {
            return Err(QueryError::validation(format!(
                "Cannot compare a timestamp with {} '{}'",
                other.kind(),
                other
            )))
        }
    };

    const LAYOUTS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

    for layout in LAYOUTS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, layout) {
            return Ok(Value::Timestamp(ts));
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Ok(Value::Timestamp(ts.naive_utc()));
    }
    if let Some(ts) = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(Value::Timestamp(ts));
    }

    Err(QueryError::validation(format!(
        "Invalid ISO-8601 timestamp '{}'",
        text
    )))
}
