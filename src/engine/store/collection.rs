//! Collection operations over the shared in-memory store
//!
//! Every operation is a linear scan of the collection in insertion order.
//! Mutations rewrite the whole store file before returning.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::cursor::Cursor;
use super::document::{into_document, kind_name, Document};
use super::error::{Result, StoreError};
use super::query::{Filter, Projection};
use super::storage::Shared;
use super::update::Update;

/// Outcome of `update_one` / `update_many`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateResult {
    pub matched_count: usize,
    pub modified_count: usize,
    /// Always `None`; upserts are not supported
    pub upserted_id: Option<Value>,
}

/// Handle to one collection of one database
#[derive(Debug, Clone)]
pub struct Collection {
    shared: Arc<Shared>,
    database: String,
    name: String,
}

impl Collection {
    pub(crate) fn new(shared: Arc<Shared>, database: &str, name: &str) -> Self {
        Self {
            shared,
            database: database.to_string(),
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run `f` over the current documents. An absent collection reads as empty.
    async fn read<T>(&self, f: impl FnOnce(&[Document]) -> T) -> T {
        let databases = self.shared.databases.lock().await;
        let docs = databases
            .get(&self.database)
            .and_then(|collections| collections.get(&self.name))
            .map(Vec::as_slice)
            .unwrap_or_default();
        f(docs)
    }

    /// Run `f` over the mutable document list and persist when it reports a change.
    ///
    /// The collection is only created in the store if `f` asks for a persist.
    async fn write<T>(&self, f: impl FnOnce(&mut Vec<Document>) -> (T, bool)) -> Result<T> {
        let mut databases = self.shared.databases.lock().await;

        let (out, persist) = match databases
            .get_mut(&self.database)
            .and_then(|collections| collections.get_mut(&self.name))
        {
            Some(docs) => f(docs),
            None => {
                let mut docs = Vec::new();
                let (out, persist) = f(&mut docs);
                if persist {
                    databases
                        .entry(self.database.clone())
                        .or_default()
                        .insert(self.name.clone(), docs);
                }
                (out, persist)
            }
        };

        if persist {
            self.shared.persist(&databases).await?;
        }
        Ok(out)
    }

    /// First matching document, projected
    pub async fn find_one(&self, filter: &Value, projection: Option<&Value>) -> Result<Option<Document>> {
        let filter = Filter::from_value(filter)?;
        let projection = parse_projection(projection)?;

        Ok(self
            .read(|docs| docs.iter().find(|doc| filter.matches(doc)).map(|doc| projection.apply(doc)))
            .await)
    }

    /// All matching documents, projected, behind a cursor
    pub async fn find(&self, filter: &Value, projection: Option<&Value>) -> Result<Cursor> {
        let filter = Filter::from_value(filter)?;
        let projection = parse_projection(projection)?;

        let docs = self
            .read(|docs| {
                docs.iter()
                    .filter(|doc| filter.matches(doc))
                    .map(|doc| projection.apply(doc))
                    .collect::<Vec<_>>()
            })
            .await;
        Ok(Cursor::new(docs))
    }

    pub async fn count_documents(&self, filter: &Value) -> Result<usize> {
        let filter = Filter::from_value(filter)?;
        Ok(self.read(|docs| docs.iter().filter(|doc| filter.matches(doc)).count()).await)
    }

    /// Append a document. No identifier is assigned.
    pub async fn insert_one(&self, document: Value) -> Result<bool> {
        let doc = into_document(document)?;
        self.write(|docs| {
            docs.push(doc);
            ((), true)
        })
        .await?;
        debug!(collection = %self.name, "inserted 1 document");
        Ok(true)
    }

    /// Append several documents. Nothing is inserted if any of them is not an object.
    pub async fn insert_many(&self, documents: Vec<Value>) -> Result<bool> {
        let new_docs = documents
            .into_iter()
            .map(into_document)
            .collect::<Result<Vec<_>>>()?;
        let count = new_docs.len();
        self.write(|docs| {
            docs.extend(new_docs);
            ((), true)
        })
        .await?;
        debug!(collection = %self.name, count, "inserted documents");
        Ok(true)
    }

    /// Update the first match. Persists only when the document changed.
    pub async fn update_one(&self, filter: &Value, update: &Value) -> Result<UpdateResult> {
        let filter = Filter::from_value(filter)?;
        let update = Update::from_value(update)?;

        let result = self
            .write(|docs| match docs.iter_mut().find(|doc| filter.matches(doc)) {
                Some(doc) => {
                    let modified = update.apply(doc);
                    (
                        UpdateResult {
                            matched_count: 1,
                            modified_count: usize::from(modified),
                            upserted_id: None,
                        },
                        modified,
                    )
                }
                None => (UpdateResult::default(), false),
            })
            .await?;
        debug!(collection = %self.name, matched = result.matched_count, modified = result.modified_count, "update_one");
        Ok(result)
    }

    /// Update every match. Both counters report the number of matched documents.
    pub async fn update_many(&self, filter: &Value, update: &Value) -> Result<UpdateResult> {
        let filter = Filter::from_value(filter)?;
        let update = Update::from_value(update)?;

        let matched = self
            .write(|docs| {
                let mut matched = 0usize;
                for doc in docs.iter_mut().filter(|doc| filter.matches(doc)) {
                    update.apply(doc);
                    matched += 1;
                }
                (matched, matched > 0)
            })
            .await?;
        debug!(collection = %self.name, matched, "update_many");
        Ok(UpdateResult {
            matched_count: matched,
            modified_count: matched,
            upserted_id: None,
        })
    }

    /// Remove the first match. Returns whether a document was removed.
    pub async fn delete_one(&self, filter: &Value) -> Result<bool> {
        let filter = Filter::from_value(filter)?;

        let removed = self
            .write(|docs| match docs.iter().position(|doc| filter.matches(doc)) {
                Some(index) => {
                    docs.remove(index);
                    (true, true)
                }
                None => (false, false),
            })
            .await?;
        debug!(collection = %self.name, removed, "delete_one");
        Ok(removed)
    }

    /// Remove every match and return how many were removed. Always persists.
    pub async fn delete_many(&self, filter: &Value) -> Result<usize> {
        let filter = Filter::from_value(filter)?;

        let removed = self
            .write(|docs| {
                let before = docs.len();
                docs.retain(|doc| !filter.matches(doc));
                (before - docs.len(), true)
            })
            .await?;
        debug!(collection = %self.name, removed, "delete_many");
        Ok(removed)
    }

    /// Accept an index hint and return its conventional name.
    ///
    /// `keys` is a field name, a list of `[field, direction]` pairs, or an
    /// object of field to direction. The index is not built or enforced.
    pub async fn create_index(&self, keys: &Value, unique: bool) -> Result<String> {
        let parts: Vec<(String, i64)> = match keys {
            Value::String(field) => vec![(field.clone(), 1)],
            Value::Object(fields) => fields
                .iter()
                .map(|(field, dir)| index_direction(dir).map(|d| (field.clone(), d)))
                .collect::<Result<_>>()?,
            Value::Array(pairs) => pairs
                .iter()
                .map(|pair| match pair.as_array().map(Vec::as_slice) {
                    Some([Value::String(field), dir]) => Ok((field.clone(), index_direction(dir)?)),
                    _ => Err(StoreError::InvalidIndex(format!("expected [field, direction], got {}", pair))),
                })
                .collect::<Result<_>>()?,
            other => {
                return Err(StoreError::InvalidIndex(format!(
                    "expected a field name, pair list or object, got {}",
                    kind_name(other)
                )))
            }
        };

        if parts.is_empty() {
            return Err(StoreError::InvalidIndex("no fields given".to_string()));
        }

        let name = parts
            .iter()
            .map(|(field, dir)| format!("{}_{}", field, dir))
            .collect::<Vec<_>>()
            .join("_");
        debug!(collection = %self.name, index = %name, unique, "accepted index hint");
        Ok(name)
    }
}

fn parse_projection(projection: Option<&Value>) -> Result<Projection> {
    projection.map(Projection::from_value).transpose().map(Option::unwrap_or_default)
}

fn index_direction(dir: &Value) -> Result<i64> {
    match dir.as_i64() {
        Some(d @ (1 | -1)) => Ok(d),
        _ => Err(StoreError::InvalidIndex(format!("direction must be 1 or -1, got {}", dir))),
    }
}
