//! Dotted-path traversal over structured values
//!
//! Each path segment first tries attribute access (computed members such as
//! `timestamp.year`) and falls back to key access on objects.

use std::borrow::Cow;

use chrono::{Datelike, Timelike};

use super::Value;

/// Member lookup capabilities of a value
pub trait FieldAccess {
    /// Computed attribute, if this value exposes one under `name`
    fn attribute(&self, name: &str) -> Option<Value>;

    /// Stored member under `name`
    fn key(&self, name: &str) -> Option<&Value>;
}

impl FieldAccess for Value {
    fn attribute(&self, name: &str) -> Option<Value> {
        let Value::Timestamp(ts) = self else {
            return None;
        };
        let component = match name {
            "year" => ts.year() as i64,
            "month" => ts.month() as i64,
            "day" => ts.day() as i64,
            "hour" => ts.hour() as i64,
            "minute" => ts.minute() as i64,
            "second" => ts.second() as i64,
            _ => return None,
        };
        Some(Value::Int(component))
    }

    fn key(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

/// Resolves a dot-separated path against `root`.
///
/// Returns `None` as soon as a segment can be resolved neither as an
/// attribute nor as a key.
pub fn resolve_path<'a>(root: &'a Value, path: &str) -> Option<Cow<'a, Value>> {
    let mut current = Cow::Borrowed(root);

    for segment in path.split('.') {
        if let Some(attribute) = current.attribute(segment) {
            current = Cow::Owned(attribute);
            continue;
        }
        current = match current {
            Cow::Borrowed(value) => Cow::Borrowed(value.key(segment)?),
            Cow::Owned(value) => Cow::Owned(value.key(segment)?.clone()),
        };
    }

    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_nested_keys() {
        let source = Value::from(json!({"data": {"x": 1, "y": "yes"}}));

        assert_eq!(
            resolve_path(&source, "data.x").map(Cow::into_owned),
            Some(Value::Int(1))
        );
        assert_eq!(
            resolve_path(&source, "data.y").map(Cow::into_owned),
            Some(Value::from("yes"))
        );
    }

    #[test]
    fn test_missing_segment() {
        let source = Value::from(json!({"data": {"x": 1}}));

        assert!(resolve_path(&source, "data.z").is_none());
        assert!(resolve_path(&source, "data.x.deeper").is_none());
        assert!(resolve_path(&source, "other").is_none());
    }

    #[test]
    fn test_null_is_resolved() {
        let source = Value::from(json!({"data": null}));
        assert_eq!(
            resolve_path(&source, "data").map(Cow::into_owned),
            Some(Value::Null)
        );
    }

    #[test]
    fn test_timestamp_attributes() {
        let at = NaiveDate::from_ymd_opt(2009, 1, 1)
            .unwrap()
            .and_hms_opt(10, 35, 0)
            .unwrap();
        let mut source = Value::object();
        source
            .as_object_mut()
            .unwrap()
            .insert("created".to_string(), Value::from(at));

        assert_eq!(
            resolve_path(&source, "created.minute").map(Cow::into_owned),
            Some(Value::Int(35))
        );
        assert!(resolve_path(&source, "created.weekday").is_none());
    }
}
