//! Dereference command handler

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use clap::Args;
use colored::*;

use crate::almanac::TableName;
use crate::config::{Config, InputOverrides};
use crate::io::write_document;
use crate::services::build_document;

#[derive(Debug, Clone, Args)]
pub struct DereferenceArgs {
    /// Table whose dereferenced records become the output content
    #[arg(long, default_value = "statements")]
    pub root: TableName,
}

impl Default for DereferenceArgs {
    fn default() -> Self {
        DereferenceArgs {
            root: TableName::Statements,
        }
    }
}

/// Read every needed table, dereference `root` and write the document
pub fn handle_dereference_command(
    args: DereferenceArgs,
    config_path: Option<&Path>,
    inputs: &InputOverrides,
    output: Option<PathBuf>,
    quiet: bool,
) -> Result<()> {
    let config = Config::load(config_path, inputs, output)?;
    let start = Instant::now();

    let document = build_document(&config.inputs, args.root)?;
    write_document(&document, &config.output, quiet)?;

    log::info!(
        "Dereferenced {} {} records in {:.2}ms",
        document.content.len(),
        args.root,
        start.elapsed().as_secs_f64() * 1000.0
    );

    if !quiet {
        println!(
            "Dereferenced {} {} records",
            document.content.len().to_string().bright_green().bold(),
            args.root
        );
    }
    Ok(())
}
