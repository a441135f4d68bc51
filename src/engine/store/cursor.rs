//! Result cursor returned by `Collection::find`

use std::cmp::Ordering;

use serde_json::Value;

use super::document::{compare_for_sort, Document};

/// Sort direction. `-1` is descending, anything else ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl From<i32> for SortDirection {
    fn from(direction: i32) -> Self {
        if direction == -1 {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        }
    }
}

/// Documents already filtered and projected, waiting to be sorted and collected
#[derive(Debug, Clone)]
pub struct Cursor {
    docs: Vec<Document>,
}

impl Cursor {
    pub(crate) fn new(docs: Vec<Document>) -> Self {
        Self { docs }
    }

    /// Stable sort on one field. A missing field sorts as the number 0.
    pub fn sort(self, key: &str, direction: impl Into<SortDirection>) -> Self {
        self.sort_by_keys(&[(key, direction.into())])
    }

    /// Stable sort on several fields, earlier keys taking precedence
    pub fn sort_by_keys(mut self, keys: &[(&str, SortDirection)]) -> Self {
        let zero = Value::from(0);
        self.docs.sort_by(|a, b| {
            keys.iter()
                .map(|(key, direction)| {
                    let ordering = compare_for_sort(
                        a.get(*key).unwrap_or(&zero),
                        b.get(*key).unwrap_or(&zero),
                    );
                    match direction {
                        SortDirection::Ascending => ordering,
                        SortDirection::Descending => ordering.reverse(),
                    }
                })
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        });
        self
    }

    /// Collect up to `limit` documents, or all of them
    pub fn to_list(self, limit: Option<usize>) -> Vec<Document> {
        let mut docs = self.docs;
        if let Some(n) = limit {
            docs.truncate(n);
        }
        docs
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}
