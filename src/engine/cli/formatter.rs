//! CLI Output Formatting Module
//! Provides consistent, colorized output for terminal UX

use colored::Colorize;
use serde_json::Value;

use crate::engine::store::Document;

pub struct CliFormatter;

impl CliFormatter {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green().bold(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue().bold(), message);
    }

    /// Print a section header
    pub fn header(title: &str) {
        println!("\n{}", title.bright_cyan().bold());
        println!("{}", "─".repeat(title.len()).bright_black());
    }

    /// Print a key-value pair
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", key.bright_white().bold(), value);
    }

    /// Print a list item
    pub fn item(text: &str) {
        println!("  {} {}", "•".bright_black(), text);
    }

    /// Print a document as indented JSON
    pub fn document(doc: &Document) {
        let pretty = serde_json::to_string_pretty(&Value::Object(doc.clone()))
            .unwrap_or_else(|_| "{}".to_string());
        for line in pretty.lines() {
            println!("  {}", line);
        }
    }
}

/// Format file size in human-readable format
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_idx])
}

/// Pluralize a document count
pub fn format_count(count: usize) -> String {
    match count {
        1 => "1 document".to_string(),
        n => format!("{} documents", n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500.00 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1048576), "1.00 MB");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0 documents");
        assert_eq!(format_count(1), "1 document");
        assert_eq!(format_count(12), "12 documents");
    }
}
