//! Biolink CLI Module
//! Command-line interface for inspecting and editing a store file

pub mod formatter;

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

use crate::engine::config::{ConfigError, StoreConfig};

#[derive(Parser, Debug)]
#[command(name = "biolink-store")]
#[command(version)]
#[command(about = "Inspect and edit the biolink document store", long_about = None)]
pub struct Cli {
    /// Project directory holding biolink.config.json (defaults to current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Store file, overrides the config
    #[arg(long, global = true)]
    pub file: Option<PathBuf>,

    /// Database name, overrides the config
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Output format (json for scripting)
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List collections with document counts
    Collections,

    /// Find documents
    Find {
        collection: String,

        /// Filter document
        #[arg(long, value_parser = parse_json, default_value = "{}")]
        filter: Value,

        /// Projection document
        #[arg(long, value_parser = parse_json)]
        projection: Option<Value>,

        /// Field to sort by
        #[arg(long)]
        sort: Option<String>,

        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,

        /// Maximum number of documents
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Count matching documents
    Count {
        collection: String,

        #[arg(long, value_parser = parse_json, default_value = "{}")]
        filter: Value,
    },

    /// Insert a document, or every document of an array
    Insert {
        collection: String,

        #[arg(value_parser = parse_json)]
        document: Value,
    },

    /// Apply an update document
    Update {
        collection: String,

        #[arg(long, value_parser = parse_json)]
        filter: Value,

        #[arg(long, value_parser = parse_json)]
        update: Value,

        /// Update every match instead of the first
        #[arg(long)]
        many: bool,
    },

    /// Delete documents
    Delete {
        collection: String,

        #[arg(long, value_parser = parse_json)]
        filter: Value,

        /// Delete every match instead of the first
        #[arg(long)]
        many: bool,
    },
}

fn parse_json(raw: &str) -> Result<Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {}", e))
}

impl Cli {
    pub fn get_project_dir(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// Resolve the store config: file, then environment, then flags
    pub fn store_config(&self) -> Result<StoreConfig, ConfigError> {
        let mut config = StoreConfig::load(&self.get_project_dir())?;
        if let Some(file) = &self.file {
            config.database.file_path = file.clone();
        }
        if let Some(db) = &self.db {
            config.database.name = db.clone();
        }
        Ok(config)
    }
}
