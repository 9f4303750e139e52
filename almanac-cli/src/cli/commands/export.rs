//! Export command handler: one file per dereferenced record

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::*;

use crate::almanac::{Dereferencer, TableName};
use crate::config::{Config, InputOverrides};
use crate::io::export_records;
use crate::services::{load_tables, required_tables};

#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    /// Directory receiving one sub-directory per table
    #[arg(short, long, default_value = "dereferenced", value_name = "DIR")]
    pub dir: PathBuf,

    /// Table to export (repeatable)
    #[arg(short, long = "table", default_value = "agents")]
    pub tables: Vec<TableName>,
}

/// Dereference each requested table and write its records under `dir`
pub fn handle_export_command(
    args: ExportArgs,
    config_path: Option<&Path>,
    inputs: &InputOverrides,
    quiet: bool,
) -> Result<()> {
    let config = Config::load(config_path, inputs, None)?;

    let needed = args
        .tables
        .iter()
        .flat_map(|table| required_tables(*table))
        .collect::<std::collections::BTreeSet<_>>();
    let mut engine =
        Dereferencer::new(load_tables(&config.inputs, needed)?).context("Failed to index input tables")?;

    for table in &args.tables {
        engine
            .dereference(*table)
            .with_context(|| format!("Failed to dereference {}", table))?;

        let records = engine.records(*table).unwrap_or_default();
        let written = export_records(*table, records, &args.dir)?;

        if !quiet {
            println!(
                "{} Exported {} {} records to {}",
                "✓".bright_green(),
                written,
                table,
                args.dir.join(table.as_str()).display().to_string().cyan()
            );
        }
    }
    Ok(())
}
