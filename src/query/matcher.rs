//! Field comparison shared by match, term, terms, multi_match and exists

use crate::value::{resolve_path, Value};

const KEYWORD_SUFFIX: &str = ".keyword";

/// A field reference with decorations removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRef<'a> {
    pub path: &'a str,
    /// Set by a `.keyword` suffix; disables substring matching
    pub exact: bool,
}

impl<'a> FieldRef<'a> {
    /// Strips a `*` boost suffix and a trailing `.keyword` (any case)
    pub fn parse(field: &'a str) -> Self {
        let field = field.split('*').next().unwrap_or(field);
        let len = field.len();
        let exact = len >= KEYWORD_SUFFIX.len()
            && field.is_char_boundary(len - KEYWORD_SUFFIX.len())
            && field[len - KEYWORD_SUFFIX.len()..].eq_ignore_ascii_case(KEYWORD_SUFFIX);

        let path = if exact {
            &field[..len - KEYWORD_SUFFIX.len()]
        } else {
            field
        };
        Self { path, exact }
    }
}

/// Tests `query` against the value stored under `field`.
///
/// Each element of a list value is tested on its own. Numbers and booleans
/// compare by value; everything else compares as text, accepting equality
/// or, unless the field is exact, containment of the query text.
pub fn field_matches(source: &Value, field: &str, query: &Value, ignore_case: bool) -> bool {
    let field = FieldRef::parse(field);
    let Some(found) = resolve_path(source, field.path) else {
        return false;
    };

    let needle = match query {
        Value::String(text) if ignore_case => Value::String(text.to_lowercase()),
        other => other.clone(),
    };
    let needle_text = needle.to_text();

    let candidates: &[Value] = match found.as_ref() {
        Value::Array(items) => items,
        single => std::slice::from_ref(single),
    };

    candidates.iter().any(|candidate| match candidate {
        Value::Null => false,
        Value::Bool(_) | Value::Int(_) | Value::Float(_) => *candidate == needle,
        other => {
            let mut text = other.to_text();
            if ignore_case {
                text = text.to_lowercase();
            }
            if matches!(&needle, Value::String(n) if *n == text) {
                return true;
            }
            !field.exact && text.contains(&needle_text)
        }
    })
}

/// True when `field` resolves to a non-null value, or to a list holding one
pub fn field_exists(source: &Value, field: &str) -> bool {
    let field = FieldRef::parse(field);
    match resolve_path(source, field.path).as_deref() {
        None | Some(Value::Null) => false,
        Some(Value::Array(items)) => items.iter().any(|item| !item.is_null()),
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn test_field_ref_parse() {
        assert_eq!(
            FieldRef::parse("title^2*"),
            FieldRef {
                path: "title^2",
                exact: false
            }
        );
        assert_eq!(
            FieldRef::parse("data.KEYWORD"),
            FieldRef {
                path: "data",
                exact: true
            }
        );
        assert_eq!(
            FieldRef::parse("name.keyword*3"),
            FieldRef {
                path: "name",
                exact: true
            }
        );
    }

    #[test]
    fn test_case_insensitive_substring() {
        let source = doc(json!({"data": "test_3"}));
        assert!(field_matches(&source, "data", &Value::from("TEST"), true));
        assert!(!field_matches(&source, "data", &Value::from("TEST"), false));
        assert!(field_matches(&source, "data", &Value::from("3"), false));
    }

    #[test]
    fn test_keyword_disables_substring_but_keeps_case_folding() {
        let source = doc(json!({"data": "test_3"}));
        assert!(!field_matches(&source, "data.keyword", &Value::from("TEST"), true));
        assert!(field_matches(&source, "data.keyword", &Value::from("TEST_3"), true));
    }

    #[test]
    fn test_keyword_without_case_folding() {
        let source = doc(json!({"data": "test_3"}));
        assert!(!field_matches(&source, "data.keyword", &Value::from("TEST"), false));
        assert!(!field_matches(&source, "data.keyword", &Value::from("TEST_3"), false));
        assert!(field_matches(&source, "data.keyword", &Value::from("test_3"), false));
    }

    #[test]
    fn test_numbers_compare_by_value() {
        let source = doc(json!({"data": [1, 11, 13], "score": 2.0}));
        assert!(field_matches(&source, "data", &Value::Int(1), true));
        assert!(!field_matches(&source, "data", &Value::Int(3), true));
        assert!(field_matches(&source, "score", &Value::Int(2), false));
    }

    #[test]
    fn test_string_list_elements() {
        let source = doc(json!({"data": ["1", "two", "three"]}));
        assert!(field_matches(&source, "data", &Value::from("1"), true));
        assert!(field_matches(&source, "data", &Value::from("TWO"), true));
        assert!(!field_matches(&source, "data", &Value::from("four"), true));
    }

    #[test]
    fn test_missing_and_null_never_match() {
        let source = doc(json!({"data": null}));
        assert!(!field_matches(&source, "data", &Value::from("null"), true));
        assert!(!field_matches(&source, "other", &Value::from("x"), true));
    }

    #[test]
    fn test_field_exists() {
        let source = doc(json!({"a": {"b": 0, "c": null, "d": [null, 1], "e": [null]}}));
        assert!(field_exists(&source, "a.b"));
        assert!(!field_exists(&source, "a.c"));
        assert!(field_exists(&source, "a.d"));
        assert!(!field_exists(&source, "a.e"));
        assert!(!field_exists(&source, "a.z"));
    }
}
