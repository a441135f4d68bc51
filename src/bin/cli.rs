//! Biolink CLI - entry point for the `biolink-store` binary
//!
//! Reads and edits the whole-state store file used by the page builder backend.

use anyhow::{bail, Context, Result};
use biolink_lib::engine::{
    cli::formatter::{format_count, format_size, CliFormatter},
    cli::{Cli, Commands, OutputFormat},
    store::{Database, SortDirection},
};
use clap::Parser;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run_cli(cli).await {
        CliFormatter::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run_cli(cli: Cli) -> Result<()> {
    let config = cli.store_config().context("loading store config")?;
    let client = config.open_client();
    let db = client.database(&config.database.name);
    let json_output = cli.format == OutputFormat::Json;

    match cli.command {
        Commands::Collections => {
            let size = std::fs::metadata(client.path()).map(|m| m.len()).unwrap_or(0);
            cmd_collections(&db, &config.database.file_path.display().to_string(), size, json_output).await?;
        }
        Commands::Find { collection, filter, projection, sort, desc, limit } => {
            let direction = if desc { SortDirection::Descending } else { SortDirection::Ascending };
            let mut cursor = db.collection(&collection).find(&filter, projection.as_ref()).await?;
            if let Some(key) = sort {
                cursor = cursor.sort(&key, direction);
            }
            let docs = cursor.to_list(limit);

            if json_output {
                let docs: Vec<Value> = docs.into_iter().map(Value::Object).collect();
                println!("{}", serde_json::to_string_pretty(&docs)?);
            } else {
                CliFormatter::header(&format!("{} ({})", collection, format_count(docs.len())));
                for doc in &docs {
                    CliFormatter::document(doc);
                }
            }
        }
        Commands::Count { collection, filter } => {
            let count = db.collection(&collection).count_documents(&filter).await?;
            if json_output {
                println!("{}", json!({ "collection": collection, "count": count }));
            } else {
                CliFormatter::kv(&collection, &format_count(count));
            }
        }
        Commands::Insert { collection, document } => {
            let col = db.collection(&collection);
            let count = match document {
                Value::Array(docs) => {
                    let count = docs.len();
                    col.insert_many(docs).await?;
                    count
                }
                Value::Object(_) => {
                    col.insert_one(document).await?;
                    1
                }
                _ => bail!("document must be a JSON object or an array of objects"),
            };
            if json_output {
                println!("{}", json!({ "inserted": count }));
            } else {
                CliFormatter::success(&format!("Inserted {} into {}", format_count(count), collection));
            }
        }
        Commands::Update { collection, filter, update, many } => {
            let col = db.collection(&collection);
            let result = if many {
                col.update_many(&filter, &update).await?
            } else {
                col.update_one(&filter, &update).await?
            };
            if json_output {
                println!("{}", serde_json::to_string(&result)?);
            } else if result.matched_count == 0 {
                CliFormatter::info("No matching document");
            } else {
                CliFormatter::success(&format!(
                    "Matched {}, modified {}",
                    result.matched_count, result.modified_count
                ));
            }
        }
        Commands::Delete { collection, filter, many } => {
            let col = db.collection(&collection);
            let removed = if many {
                col.delete_many(&filter).await?
            } else {
                usize::from(col.delete_one(&filter).await?)
            };
            if json_output {
                println!("{}", json!({ "deleted": removed }));
            } else {
                CliFormatter::success(&format!("Deleted {} from {}", format_count(removed), collection));
            }
        }
    }

    client.close();
    Ok(())
}

async fn cmd_collections(db: &Database, file: &str, size: u64, json: bool) -> Result<()> {
    let mut counts = Vec::new();
    for name in db.list_collection_names().await {
        let count = db.collection(&name).count_documents(&json!({})).await?;
        counts.push((name, count));
    }

    if json {
        let collections: serde_json::Map<String, Value> =
            counts.into_iter().map(|(name, count)| (name, json!(count))).collect();
        println!("{}", json!({ "file": file, "database": db.name(), "collections": collections }));
    } else {
        CliFormatter::header("Biolink Store");
        CliFormatter::kv("File", &format!("{} ({})", file, format_size(size)));
        CliFormatter::kv("Database", db.name());
        if counts.is_empty() {
            CliFormatter::info("No collections yet");
        }
        for (name, count) in counts {
            CliFormatter::item(&format!("{}: {}", name, format_count(count)));
        }
    }

    Ok(())
}
