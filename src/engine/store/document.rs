//! Document representation and value comparison

use std::cmp::Ordering;

use serde_json::{Map, Number, Value};

use super::error::{Result, StoreError};

/// A stored record: field name to arbitrary JSON value.
pub type Document = Map<String, Value>;

/// Field name reserved for storage-assigned identifiers. Filters never match on it.
pub const ID_FIELD: &str = "_id";

pub(crate) static NULL: Value = Value::Null;

/// Convert a JSON value into a document, rejecting anything that is not an object
pub fn into_document(value: Value) -> Result<Document> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidDocument(format!(
            "expected an object, got {}",
            kind_name(&other)
        ))),
    }
}

/// Strip the optional `$` prefix from an operator tag
pub(crate) fn operator_name(tag: &str) -> &str {
    tag.strip_prefix('$').unwrap_or(tag)
}

pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Deep equality where numbers compare by value, so `1` equals `1.0`
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).is_some_and(|w| values_equal(v, w)))
        }
        _ => a == b,
    }
}

fn numbers_equal(x: &Number, y: &Number) -> bool {
    if let (Some(a), Some(b)) = (x.as_i64(), y.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (x.as_u64(), y.as_u64()) {
        return a == b;
    }
    match (x.as_f64(), y.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Compare a field against a value, treating a missing field as `null`
pub fn field_equals(doc: &Document, field: &str, expected: &Value) -> bool {
    values_equal(doc.get(field).unwrap_or(&NULL), expected)
}

/// True when `entry` is an object holding every key/value pair of `pattern`.
///
/// Keys of `pattern` missing from `entry` compare as `null`.
pub fn contains_subset(entry: &Value, pattern: &Document) -> bool {
    match entry {
        Value::Object(map) => pattern.iter().all(|(k, v)| field_equals(map, k, v)),
        _ => false,
    }
}

/// Total order used by cursor sorting.
///
/// Booleans and numbers share one numeric scale. Values of different
/// kinds order by kind: null, numeric, string, array, object. Objects
/// compare equal to each other.
pub fn compare_for_sort(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => x
            .iter()
            .zip(y)
            .map(|(x, y)| compare_for_sort(x, y))
            .find(|o| o.is_ne())
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        _ if sort_rank(a) == 1 && sort_rank(b) == 1 => numeric_key(a).total_cmp(&numeric_key(b)),
        _ => sort_rank(a).cmp(&sort_rank(b)),
    }
}

fn sort_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) | Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Array(_) => 3,
        Value::Object(_) => 4,
    }
}

fn numeric_key(value: &Value) -> f64 {
    match value {
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_compare_by_value() {
        assert!(values_equal(&json!(1), &json!(1.0)));
        assert!(values_equal(&json!({"a": [1, 2]}), &json!({"a": [1.0, 2]})));
        assert!(!values_equal(&json!(1), &json!("1")));
        assert!(!values_equal(&json!([1, 2]), &json!([2, 1])));
    }

    #[test]
    fn test_missing_field_equals_null() {
        let doc = into_document(json!({"a": 1})).unwrap();
        assert!(field_equals(&doc, "b", &Value::Null));
        assert!(!field_equals(&doc, "a", &Value::Null));
    }

    #[test]
    fn test_contains_subset() {
        let pattern = into_document(json!({"a": 1})).unwrap();
        assert!(contains_subset(&json!({"a": 1, "b": 2}), &pattern));
        assert!(!contains_subset(&json!({"a": 2}), &pattern));
        assert!(!contains_subset(&json!("a"), &pattern));
    }

    #[test]
    fn test_sort_order_across_kinds() {
        assert_eq!(compare_for_sort(&json!(2), &json!(10)), Ordering::Less);
        assert_eq!(compare_for_sort(&json!(true), &json!(0)), Ordering::Greater);
        assert_eq!(compare_for_sort(&json!("b"), &json!("a")), Ordering::Greater);
        assert_eq!(compare_for_sort(&json!(0), &json!("a")), Ordering::Less);
        assert_eq!(compare_for_sort(&json!(null), &json!(0)), Ordering::Less);
    }

    #[test]
    fn test_into_document_rejects_scalars() {
        assert!(into_document(json!([1])).is_err());
        assert!(into_document(json!({})).unwrap().is_empty());
    }
}
