//! Store Error Types

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Invalid update: {0}")]
    InvalidUpdate(String),

    #[error("Invalid projection: {0}")]
    InvalidProjection(String),

    #[error("Invalid index specification: {0}")]
    InvalidIndex(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
