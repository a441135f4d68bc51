// Biolink Engine - Core module structure
pub mod config;
pub mod cli;
pub mod store;

pub use config::StoreConfig;
pub use store::Client;
