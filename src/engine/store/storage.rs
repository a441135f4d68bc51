//! Store client and whole-state durability
//!
//! The on-disk file holds one JSON object: database name to collection
//! name to an array of documents. It is read once when the client opens
//! and rewritten in full after every mutation.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::collection::Collection;
use super::document::Document;
use super::error::Result;

pub(crate) type Collections = BTreeMap<String, Vec<Document>>;
pub(crate) type Databases = BTreeMap<String, Collections>;

/// State shared by every handle created from one client
#[derive(Debug)]
pub(crate) struct Shared {
    path: PathBuf,
    pub(crate) databases: Mutex<Databases>,
}

impl Shared {
    /// Serialize every database and overwrite the store file
    pub(crate) async fn persist(&self, databases: &Databases) -> Result<()> {
        let content = serde_json::to_vec_pretty(databases)?;
        tokio::fs::write(&self.path, &content).await?;
        debug!(path = %self.path.display(), bytes = content.len(), "persisted store snapshot");
        Ok(())
    }
}

/// Entry point to a store file
#[derive(Debug, Clone)]
pub struct Client {
    shared: Arc<Shared>,
}

impl Client {
    /// Open a store file. A missing or unreadable file yields an empty store.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let databases = load_state(&path);

        Self {
            shared: Arc::new(Shared {
                path,
                databases: Mutex::new(databases),
            }),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.shared.path
    }

    /// Get a database handle. Databases exist once something is written to them.
    pub fn database(&self, name: &str) -> Database {
        Database {
            shared: Arc::clone(&self.shared),
            name: name.to_string(),
        }
    }

    pub async fn list_database_names(&self) -> Vec<String> {
        self.shared.databases.lock().await.keys().cloned().collect()
    }

    /// Nothing to release; every mutation is already on disk.
    pub fn close(&self) {}
}

/// A named database inside a client
#[derive(Debug, Clone)]
pub struct Database {
    shared: Arc<Shared>,
    name: String,
}

impl Database {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a collection handle. Reading an absent collection behaves as empty.
    pub fn collection(&self, name: &str) -> Collection {
        Collection::new(Arc::clone(&self.shared), &self.name, name)
    }

    pub async fn list_collection_names(&self) -> Vec<String> {
        self.shared
            .databases
            .lock()
            .await
            .get(&self.name)
            .map(|collections| collections.keys().cloned().collect())
            .unwrap_or_default()
    }
}

fn load_state(path: &Path) -> Databases {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no store file, starting empty");
            return Databases::new();
        }
    };

    match serde_json::from_str::<Databases>(&content) {
        Ok(databases) => {
            let documents: usize = databases
                .values()
                .flat_map(|collections| collections.values())
                .map(Vec::len)
                .sum();
            info!(
                path = %path.display(),
                databases = databases.len(),
                documents,
                "loaded store file"
            );
            databases
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable store file");
            Databases::new()
        }
    }
}
