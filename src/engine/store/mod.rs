//! Biolink Document Store
//!
//! A schema-less document store kept in memory and persisted as one JSON file:
//! - Equality and membership filters
//! - Inclusion/exclusion projections
//! - set/push/pull/unset update operators
//! - Whole-state save after every mutation

pub mod storage;
pub mod collection;
pub mod cursor;
pub mod document;
pub mod query;
pub mod update;
pub mod error;

pub use storage::{Client, Database};
pub use collection::{Collection, UpdateResult};
pub use cursor::{Cursor, SortDirection};
pub use document::{Document, ID_FIELD};
pub use query::{Condition, Filter, Projection};
pub use update::{Update, UpdateOp};
pub use error::StoreError;
