//! Populate-descriptions command handler

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::*;

use crate::almanac::TableName;
use crate::config::{Config, InputOverrides};
use crate::io::{read_records, write_records};
use crate::services::populate_descriptions;

/// Copy each indication's description onto the statements referencing it
///
/// The statements are written to `output`, or back to their input file.
pub fn handle_describe_command(
    config_path: Option<&Path>,
    inputs: &InputOverrides,
    output: Option<PathBuf>,
    quiet: bool,
) -> Result<()> {
    let config = Config::load(config_path, inputs, None)?;

    let statements_path = config.inputs.table(TableName::Statements);
    let indications = read_records(
        TableName::Indications,
        config.inputs.table(TableName::Indications),
    )?;
    let mut statements = read_records(TableName::Statements, statements_path)?;

    let updated = populate_descriptions(&mut statements, &indications)
        .context("Failed to populate statement descriptions")?;

    let output = output.as_deref().unwrap_or(statements_path);
    write_records(&statements, output, quiet)?;

    if !quiet {
        println!(
            "Updated descriptions on {} of {} statements",
            updated.to_string().bright_green().bold(),
            statements.len()
        );
    }
    Ok(())
}
