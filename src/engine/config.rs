//! Store Configuration Module
//! Handles loading biolink.config.json and environment overrides

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::engine::store::{Client, Database};

pub const CONFIG_FILE: &str = "biolink.config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Invalid config format: {0}")]
    ParseError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Whole-state store file
    #[serde(default = "default_file_path")]
    pub file_path: PathBuf,
    /// Database used by the application
    #[serde(default = "default_name")]
    pub name: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            file_path: default_file_path(),
            name: default_name(),
        }
    }
}

fn default_file_path() -> PathBuf {
    PathBuf::from("local_db.json")
}

fn default_name() -> String {
    "my_local_db".to_string()
}

impl StoreConfig {
    /// Load config from a project directory, then apply `DB_FILE_PATH` / `DB_NAME`
    pub fn load(project_dir: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_dir(project_dir)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read the config file only, defaults when it is absent.
    /// Relative store paths resolve against the project directory.
    pub fn from_dir(project_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = project_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        let mut config: StoreConfig = serde_json::from_str(&content)?;
        if config.database.file_path.is_relative() {
            config.database.file_path = project_dir.join(&config.database.file_path);
        }
        Ok(config)
    }

    pub fn save(&self, project_dir: &Path) -> Result<(), ConfigError> {
        let config_path = project_dir.join(CONFIG_FILE);
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("DB_FILE_PATH").filter(|v| !v.is_empty()) {
            self.database.file_path = PathBuf::from(path);
        }
        if let Some(name) = lookup("DB_NAME").filter(|v| !v.is_empty()) {
            self.database.name = name;
        }
    }

    pub fn open_client(&self) -> Client {
        Client::open(&self.database.file_path)
    }

    /// Open the store file and return the configured database
    pub fn database(&self) -> Database {
        self.open_client().database(&self.database.name)
    }
}
