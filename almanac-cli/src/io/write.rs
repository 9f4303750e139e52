//! Writing JSON output files
//!
//! Output is fully serialized in memory before the file is created, so a
//! failed run never leaves a truncated file behind.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::almanac::Record;

/// Keys of the output document that must hold records
pub const RECORD_KEYS: &[&str] = &["content"];

/// The dereferenced knowledge base as written to disk
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub about: Value,
    pub content: Vec<Record>,
}

impl Document {
    pub fn new(about: Value, content: Vec<Record>) -> Self {
        Document { about, content }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OutputError {
    #[error("Output data must be a JSON object")]
    NotAnObject,

    #[error("Output is missing records key '{key}'")]
    MissingKey { key: String },

    #[error("All elements in the list must be objects for key '{key}'")]
    SerializationType { key: String },
}

/// Check that every key in `record_keys` holds an array of objects
pub fn check_record_keys(data: &Value, record_keys: &[&str]) -> Result<(), OutputError> {
    let Value::Object(map) = data else {
        return Err(OutputError::NotAnObject);
    };

    for key in record_keys {
        let value = map.get(*key).ok_or_else(|| OutputError::MissingKey {
            key: key.to_string(),
        })?;
        let all_records = value
            .as_array()
            .is_some_and(|items| items.iter().all(Value::is_object));
        if !all_records {
            return Err(OutputError::SerializationType {
                key: key.to_string(),
            });
        }
    }
    Ok(())
}

/// Write `data` as 2-space indented JSON after checking its record keys
pub fn write_json(data: &Value, record_keys: &[&str], path: &Path, quiet: bool) -> Result<()> {
    check_record_keys(data, record_keys)?;

    let json = serde_json::to_string_pretty(data).context("Failed to serialize output to JSON")?;
    write_file(path, &json)?;

    if !quiet {
        println!(
            "{} JSON successfully written to {}",
            "✓".bright_green(),
            path.display().to_string().cyan()
        );
    }
    Ok(())
}

/// Write the dereferenced document
pub fn write_document(document: &Document, path: &Path, quiet: bool) -> Result<()> {
    let data = serde_json::to_value(document).context("Failed to serialize output document")?;
    write_json(&data, RECORD_KEYS, path, quiet)
}

/// Write a bare array of records
pub fn write_records(records: &[Record], path: &Path, quiet: bool) -> Result<()> {
    let json = serde_json::to_string_pretty(records).context("Failed to serialize records to JSON")?;
    write_file(path, &json)?;

    if !quiet {
        println!(
            "{} {} records written to {}",
            "✓".bright_green(),
            records.len(),
            path.display().to_string().cyan()
        );
    }
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, contents)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    log::debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}
