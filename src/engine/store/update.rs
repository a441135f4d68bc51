//! Update operators applied to stored documents

use serde_json::Value;

use super::document::{contains_subset, field_equals, kind_name, operator_name, values_equal, Document};
use super::error::{Result, StoreError};

/// A single update operator with its field arguments
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOp {
    /// Assign fields
    Set(Document),
    /// Append to array fields, creating them when needed
    Push(Document),
    /// Remove matching entries from array fields
    Pull(Document),
    /// Remove fields
    Unset(Vec<String>),
}

impl UpdateOp {
    /// Apply to a document in place. Returns true if the document changed.
    fn apply(&self, doc: &mut Document) -> bool {
        match self {
            UpdateOp::Set(fields) => {
                let mut modified = false;
                for (field, value) in fields {
                    if !field_equals(doc, field, value) {
                        doc.insert(field.clone(), value.clone());
                        modified = true;
                    }
                }
                modified
            }
            UpdateOp::Push(fields) => {
                for (field, value) in fields {
                    let slot = doc.entry(field.clone()).or_insert_with(|| Value::Array(Vec::new()));
                    if !slot.is_array() {
                        *slot = Value::Array(Vec::new());
                    }
                    if let Value::Array(items) = slot {
                        items.push(value.clone());
                    }
                }
                !fields.is_empty()
            }
            UpdateOp::Pull(fields) => {
                let mut modified = false;
                for (field, value) in fields {
                    let Some(Value::Array(items)) = doc.get_mut(field) else {
                        continue;
                    };
                    let before = items.len();
                    match value {
                        Value::Object(pattern) => items.retain(|item| !contains_subset(item, pattern)),
                        other => items.retain(|item| !values_equal(item, other)),
                    }
                    modified |= items.len() < before;
                }
                modified
            }
            UpdateOp::Unset(names) => {
                let mut modified = false;
                for name in names {
                    modified |= doc.remove(name).is_some();
                }
                modified
            }
        }
    }
}

/// A parsed update document, operators kept in application order
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    ops: Vec<UpdateOp>,
}

const APPLY_ORDER: [&str; 4] = ["set", "push", "pull", "unset"];

impl Update {
    /// Parse `{"$set": {...}, "$push": {...}, ...}`. Unknown operators are ignored.
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(StoreError::InvalidUpdate(format!(
                    "expected an object, got {}",
                    kind_name(other)
                )))
            }
        };

        let mut ops = Vec::new();
        for name in APPLY_ORDER {
            let args = map
                .iter()
                .filter(|(tag, _)| operator_name(tag) == name)
                .map(|(tag, args)| (tag.as_str(), args));
            for (tag, args) in args {
                ops.push(parse_op(name, tag, args)?);
            }
        }

        Ok(Self { ops })
    }

    pub fn ops(&self) -> &[UpdateOp] {
        &self.ops
    }

    /// Apply all operators in order. Returns true if any of them changed the document.
    pub fn apply(&self, doc: &mut Document) -> bool {
        self.ops
            .iter()
            .fold(false, |modified, op| op.apply(doc) | modified)
    }
}

fn parse_op(name: &str, tag: &str, args: &Value) -> Result<UpdateOp> {
    let invalid = || {
        StoreError::InvalidUpdate(format!(
            "'{}' expects an object, got {}",
            tag,
            kind_name(args)
        ))
    };

    match (name, args) {
        ("unset", Value::Object(fields)) => Ok(UpdateOp::Unset(fields.keys().cloned().collect())),
        ("unset", Value::Array(names)) => names
            .iter()
            .map(|n| n.as_str().map(str::to_string).ok_or_else(invalid))
            .collect::<Result<Vec<_>>>()
            .map(UpdateOp::Unset),
        ("set", Value::Object(fields)) => Ok(UpdateOp::Set(fields.clone())),
        ("push", Value::Object(fields)) => Ok(UpdateOp::Push(fields.clone())),
        ("pull", Value::Object(fields)) => Ok(UpdateOp::Pull(fields.clone())),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::store::document::into_document;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        into_document(value).unwrap()
    }

    fn name(op: &UpdateOp) -> &'static str {
        match op {
            UpdateOp::Set(_) => "set",
            UpdateOp::Push(_) => "push",
            UpdateOp::Pull(_) => "pull",
            UpdateOp::Unset(_) => "unset",
        }
    }

    fn apply(d: &mut Document, update: Value) -> bool {
        Update::from_value(&update).unwrap().apply(d)
    }

    #[test]
    fn test_set_reports_only_real_changes() {
        let mut d = doc(json!({"role": "user"}));

        assert!(!apply(&mut d, json!({"$set": {"role": "user"}})));
        assert!(apply(&mut d, json!({"set": {"role": "owner"}})));
        assert_eq!(d.get("role"), Some(&json!("owner")));
        assert!(!apply(&mut d, json!({"$set": {"missing": null}})));
    }

    #[test]
    fn test_push_creates_and_reinitializes() {
        let mut d = doc(json!({"scalar": 5}));

        assert!(apply(&mut d, json!({"$push": {"tags": "a", "scalar": "b"}})));
        assert_eq!(d.get("tags"), Some(&json!(["a"])));
        assert_eq!(d.get("scalar"), Some(&json!(["b"])));
    }

    #[test]
    fn test_push_then_pull_empties_field() {
        let mut d = doc(json!({"tags": []}));

        apply(&mut d, json!({"$push": {"tags": "x"}}));
        assert!(apply(&mut d, json!({"$pull": {"tags": "x"}})));
        assert_eq!(d.get("tags"), Some(&json!([])));
    }

    #[test]
    fn test_pull_by_sub_mapping() {
        let mut d = doc(json!({"items": [{"a": 1, "b": 2}, {"a": 1, "b": 3}]}));

        assert!(apply(&mut d, json!({"$pull": {"items": {"a": 1, "b": 2}}})));
        assert_eq!(d.get("items"), Some(&json!([{"a": 1, "b": 3}])));

        assert!(apply(&mut d, json!({"$pull": {"items": {"a": 1}}})));
        assert_eq!(d.get("items"), Some(&json!([])));
    }

    #[test]
    fn test_pull_on_non_array_is_noop() {
        let mut d = doc(json!({"name": "x"}));

        assert!(!apply(&mut d, json!({"$pull": {"name": "x", "absent": 1}})));
        assert_eq!(d.get("name"), Some(&json!("x")));
        assert!(!d.contains_key("absent"));
    }

    #[test]
    fn test_unset_and_unknown_operators() {
        let mut d = doc(json!({"a": 1, "b": 2}));

        assert!(apply(&mut d, json!({"$unset": {"a": ""}, "$inc": {"b": 1}})));
        assert_eq!(Value::Object(d.clone()), json!({"b": 2}));
        assert!(!apply(&mut d, json!({"$unset": ["a"]})));
    }

    #[test]
    fn test_operators_apply_in_fixed_order() {
        let update = Update::from_value(&json!({
            "$pull": {"tags": "a"},
            "$push": {"tags": "a"},
            "$set": {"tags": []}
        }))
        .unwrap();
        let names: Vec<_> = update.ops().iter().map(name).collect();
        assert_eq!(names, ["set", "push", "pull"]);

        let mut d = doc(json!({"tags": ["z"]}));
        assert!(update.apply(&mut d));
        assert_eq!(d.get("tags"), Some(&json!([])));
    }

    #[test]
    fn test_rejects_bad_shapes() {
        assert!(Update::from_value(&json!([1])).is_err());
        assert!(Update::from_value(&json!({"$set": 1})).is_err());
    }
}
