//! Biolink - document store backing the link-in-bio page builder
//!
//! The store keeps every database in memory and rewrites a single JSON
//! file on each mutation. Request handlers reach it through
//! `Client` -> `Database` -> `Collection`.

pub mod engine;

pub use engine::config::StoreConfig;
pub use engine::store::{Client, Collection, Cursor, Database, Document, StoreError, UpdateResult};
