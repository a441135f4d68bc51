//! Filter matching and projection for stored documents

use serde_json::Value;

use super::document::{field_equals, kind_name, operator_name, values_equal, Document, ID_FIELD, NULL};
use super::error::{Result, StoreError};

/// Condition applied to a single field
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Equality (a missing field equals `null`)
    Eq(Value),
    /// Field value is one of the candidates
    In(Vec<Value>),
}

impl Condition {
    fn parse(value: &Value) -> Result<Self> {
        if let Value::Object(map) = value {
            if let (1, Some((tag, candidates))) = (map.len(), map.iter().next()) {
                if operator_name(tag) == "in" {
                    return match candidates {
                        Value::Array(items) => Ok(Condition::In(items.clone())),
                        other => Err(StoreError::InvalidFilter(format!(
                            "'{}' expects an array, got {}",
                            tag,
                            kind_name(other)
                        ))),
                    };
                }
            }
        }
        Ok(Condition::Eq(value.clone()))
    }

    fn matches(&self, doc: &Document, field: &str) -> bool {
        match self {
            Condition::Eq(expected) => field_equals(doc, field, expected),
            Condition::In(candidates) => {
                let actual = doc.get(field).unwrap_or(&NULL);
                candidates.iter().any(|c| values_equal(actual, c))
            }
        }
    }
}

/// A conjunction of field conditions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Condition)>,
}

impl Filter {
    /// A filter that matches every document
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a filter document such as `{"id": "u1", "role": {"$in": ["a", "b"]}}`
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = match value {
            Value::Object(map) => map,
            Value::Null => return Ok(Self::new()),
            other => {
                return Err(StoreError::InvalidFilter(format!(
                    "expected an object, got {}",
                    kind_name(other)
                )))
            }
        };

        let conditions = map
            .iter()
            .map(|(field, cond)| Ok((field.clone(), Condition::parse(cond)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { conditions })
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Check if a document satisfies every condition. `_id` conditions are skipped.
    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions
            .iter()
            .filter(|(field, _)| field != ID_FIELD)
            .all(|(field, cond)| cond.matches(doc, field))
    }
}

/// Field selection applied to returned documents
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// Return only these fields (when present)
    Include(Vec<String>),
    /// Return everything except these fields
    Exclude(Vec<String>),
}

impl Default for Projection {
    fn default() -> Self {
        Projection::Exclude(Vec::new())
    }
}

impl Projection {
    /// Parse `{"field": 1, ...}` or `{"field": 0, ...}`.
    ///
    /// Inclusion mode is chosen when any field other than `_id` is set to 1.
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = match value {
            Value::Object(map) => map,
            Value::Null => return Ok(Self::default()),
            other => {
                return Err(StoreError::InvalidProjection(format!(
                    "expected an object, got {}",
                    kind_name(other)
                )))
            }
        };

        let mut included = Vec::new();
        let mut excluded = Vec::new();
        for (field, flag) in map {
            if projection_flag(field, flag)? {
                included.push(field.clone());
            } else {
                excluded.push(field.clone());
            }
        }

        if included.iter().any(|f| f != ID_FIELD) {
            Ok(Projection::Include(included))
        } else {
            Ok(Projection::Exclude(excluded))
        }
    }

    /// Produce the projected copy of a document
    pub fn apply(&self, doc: &Document) -> Document {
        match self {
            Projection::Include(fields) => fields
                .iter()
                .filter_map(|f| doc.get(f).map(|v| (f.clone(), v.clone())))
                .collect(),
            Projection::Exclude(fields) => {
                let mut projected = doc.clone();
                for field in fields {
                    projected.remove(field);
                }
                projected
            }
        }
    }
}

fn projection_flag(field: &str, flag: &Value) -> Result<bool> {
    match flag {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) if n.as_f64() == Some(1.0) => Ok(true),
        Value::Number(n) if n.as_f64() == Some(0.0) => Ok(false),
        other => Err(StoreError::InvalidProjection(format!(
            "field '{}' must be 0 or 1, got {}",
            field, other
        ))),
    }
}
