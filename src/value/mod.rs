//! Structured values for document sources and query operands
//!
//! Every document source, query operand and aggregation key is a [`Value`].
//! JSON input maps onto the scalar, array and object variants; timestamps
//! only enter through the Rust API and leave as ISO-8601 text.
//!
//! # Ordering
//!
//! `Value` has a total order used for sorting and bucket keys:
//! null < bool < number < string < timestamp < array < object.
//! Numbers compare numerically across `Int` and `Float`, so equality
//! agrees with the order (`Int(1) == Float(1.0)`).
//!
//! Range comparisons use [`Value::partial_compare`] instead, which only
//! relates values of the same kind.

mod path;

pub use path::{resolve_path, FieldAccess};

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// ISO-8601 layout used when a timestamp leaves the emulator
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A structured document value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Timestamp(NaiveDateTime),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Creates an empty object
    pub fn object() -> Self {
        Value::Object(BTreeMap::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    pub fn is_timestamp(&self) -> bool {
        matches!(self, Value::Timestamp(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut BTreeMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Returns a direct member of an object value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Short name of the value kind, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) | Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::Timestamp(_) => "timestamp",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Float(_) => 2,
            Value::String(_) => 3,
            Value::Timestamp(_) => 4,
            Value::Array(_) => 5,
            Value::Object(_) => 6,
        }
    }

    /// Compares two values of the same scalar kind.
    ///
    /// Returns `None` when the kinds differ or either side is null,
    /// an array or an object.
    pub fn partial_compare(&self, other: &Value) -> Option<Ordering> {
        if self.rank() != other.rank() {
            return None;
        }
        match self {
            Value::Null | Value::Array(_) | Value::Object(_) => None,
            _ => Some(self.cmp(other)),
        }
    }

    /// Text form used by match and term comparison.
    ///
    /// Integral floats keep a trailing `.0` so `1.0` never reads as `1`.
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(f) => {
                if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
                    format!("{:.1}", f)
                } else {
                    f.to_string()
                }
            }
            Value::String(s) => s.clone(),
            Value::Timestamp(ts) => ts.format(TIMESTAMP_FORMAT).to_string(),
            Value::Array(_) | Value::Object(_) => JsonValue::from(self).to_string(),
        }
    }

    /// Converts into the wire representation
    pub fn to_json(&self) -> JsonValue {
        JsonValue::from(self)
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        let by_rank = self.rank().cmp(&other.rank());
        if by_rank != Ordering::Equal {
            return by_rank;
        }

        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Int(a), Value::Float(b)) => compare_int_float(*a, *b),
            (Value::Float(a), Value::Int(b)) => compare_int_float(*b, *a).reverse(),
            (Value::Float(a), Value::Float(b)) => compare_floats(*a, *b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
            (Value::Array(a), Value::Array(b)) => a.cmp(b),
            (Value::Object(a), Value::Object(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// Exact ordering of an integer against a float, without going through `f64`
fn compare_int_float(int: i64, float: f64) -> Ordering {
    // 2^63, the first float above every i64
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;

    if float.is_nan() {
        return if float.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    if float >= LIMIT {
        return Ordering::Less;
    }
    if float < -LIMIT {
        return Ordering::Greater;
    }

    let whole = float.trunc();
    int.cmp(&(whole as i64)).then_with(|| {
        if float > whole {
            Ordering::Less
        } else if float < whole {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    })
}

/// Numeric float order; `-0.0` equals `0.0` and NaNs fall back to total order
fn compare_floats(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b))
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(0.0)),
            },
            JsonValue::String(s) => Value::String(s),
            JsonValue::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            JsonValue::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&JsonValue> for Value {
    fn from(json: &JsonValue) -> Self {
        Value::from(json.clone())
    }
}

impl From<&Value> for JsonValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Int(n) => JsonValue::from(*n),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::Timestamp(ts) => JsonValue::String(ts.format(TIMESTAMP_FORMAT).to_string()),
            Value::Array(items) => JsonValue::Array(items.iter().map(JsonValue::from).collect()),
            Value::Object(map) => JsonValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), JsonValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for JsonValue {
    fn from(value: Value) -> Self {
        JsonValue::from(&value)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Int(n as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(ts: NaiveDateTime) -> Self {
        Value::Timestamp(ts)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn ts(hour: u32, minute: u32) -> Value {
        Value::Timestamp(
            NaiveDate::from_ymd_opt(2009, 1, 1)
                .unwrap()
                .and_hms_opt(hour, minute, 0)
                .unwrap(),
        )
    }

    #[test]
    fn test_from_json_numbers() {
        assert_eq!(Value::from(json!(3)), Value::Int(3));
        assert!(matches!(Value::from(json!(2.5)), Value::Float(_)));
    }

    #[test]
    fn test_int_and_float_are_equal() {
        assert_eq!(Value::Int(1), Value::Float(1.0));
        assert!(Value::Int(1) < Value::Float(1.5));
    }

    #[test]
    fn test_large_int_float_ordering_is_exact() {
        let big = 1_i64 << 53;
        let float = Value::Float(big as f64);

        assert_eq!(Value::Int(big), float);
        assert!(Value::Int(big + 1) > float);
        assert!(float < Value::Int(big + 1));
        assert!(Value::Int(big) < Value::Int(big + 1));

        assert!(Value::Int(i64::MAX) < Value::Float(9.3e18));
        assert!(Value::Int(i64::MIN) > Value::Float(f64::NEG_INFINITY));
        assert!(Value::Int(2) < Value::Float(2.5));
        assert!(Value::Int(-2) > Value::Float(-2.5));
        assert_eq!(Value::Float(-0.0), Value::Int(0));
        assert_eq!(Value::Float(-0.0), Value::Float(0.0));
    }

    #[test]
    fn test_mixed_numeric_bucket_keys_stay_distinct() {
        let big = 1_i64 << 53;
        let mut keys = BTreeMap::new();
        keys.insert(Value::Int(big), 1);
        keys.insert(Value::Float(big as f64), 2);
        keys.insert(Value::Int(big + 1), 3);

        assert_eq!(keys.len(), 2);
        assert_eq!(keys[&Value::Int(big)], 2);
        assert_eq!(keys[&Value::Int(big + 1)], 3);
    }

    #[test]
    fn test_type_ordering() {
        let mut values = vec![
            Value::from("a"),
            Value::Int(2),
            Value::Null,
            Value::Bool(true),
        ];
        values.sort();

        assert_eq!(values[0], Value::Null);
        assert_eq!(values[1], Value::Bool(true));
        assert_eq!(values[2], Value::Int(2));
        assert_eq!(values[3], Value::from("a"));
    }

    #[test]
    fn test_partial_compare_rejects_mixed_kinds() {
        assert!(Value::Int(1).partial_compare(&Value::from("1")).is_none());
        assert!(Value::Null.partial_compare(&Value::Null).is_none());
        assert_eq!(
            ts(10, 5).partial_compare(&ts(10, 20)),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn test_to_text() {
        assert_eq!(Value::Float(1.0).to_text(), "1.0");
        assert_eq!(Value::Float(2.5).to_text(), "2.5");
        assert_eq!(Value::Int(7).to_text(), "7");
        assert_eq!(ts(10, 5).to_text(), "2009-01-01T10:05:00");
    }

    #[test]
    fn test_timestamp_serializes_as_iso_text() {
        let source = Value::Object(BTreeMap::from([("at".to_string(), ts(10, 5))]));
        assert_eq!(source.to_json(), json!({"at": "2009-01-01T10:05:00"}));
    }
}
