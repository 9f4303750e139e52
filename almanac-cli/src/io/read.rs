//! Loading JSON input files

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::almanac::{Record, TableName};

/// Parse a JSON file into a value
pub fn read_json(path: &Path) -> Result<Value> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in file: {}", path.display()))
}

/// Load one table's records: a JSON array of objects
pub fn read_records(table: TableName, path: &Path) -> Result<Vec<Record>> {
    let value = read_json(path)?;
    let records: Vec<Record> = serde_json::from_value(value).with_context(|| {
        format!(
            "{} file {} must hold a JSON array of objects",
            table,
            path.display()
        )
    })?;

    log::debug!("Read {} {} records from {}", records.len(), table, path.display());
    Ok(records)
}

/// Load the `about` metadata object; it is passed through unchanged
pub fn read_about(path: &Path) -> Result<Value> {
    let about = read_json(path)?;
    if !about.is_object() {
        anyhow::bail!("About file {} must hold a JSON object", path.display());
    }
    Ok(about)
}
