//! Command-line interface

pub mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;

use crate::config::InputOverrides;
use commands::{DereferenceArgs, ExportArgs, OrderArgs};

#[derive(Debug, Parser)]
#[command(name = "almanac")]
#[command(version)]
#[command(about = "Dereferences the Molecular Oncology Almanac knowledge base")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub inputs: InputOverrides,

    /// Output file of `dereference` [default: moalmanac-draft.dereferenced.json]
    /// or `populate-descriptions` [default: the statements input file]
    #[arg(short, long, global = true, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// TOML configuration file with input and output paths
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors and suppress progress messages
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Dereference the tables and write the knowledge base (default)
    Dereference(DereferenceArgs),
    /// Write each record of the given tables to its own file
    Export(ExportArgs),
    /// Copy indication descriptions onto their statements
    PopulateDescriptions,
    /// Print the order in which tables are resolved
    Order(OrderArgs),
}

impl Cli {
    /// Log level filter derived from -v/-q
    pub fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            return log::LevelFilter::Error;
        }
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

/// Dispatch the parsed command line
pub fn run(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = cli.config.as_deref();
    let output = cli.output;
    let quiet = cli.quiet;

    match cli.command.unwrap_or_default() {
        Commands::Dereference(args) => {
            commands::handle_dereference_command(args, config, &cli.inputs, output, quiet)
        }
        Commands::Export(args) => commands::handle_export_command(args, config, &cli.inputs, quiet),
        Commands::PopulateDescriptions => {
            commands::handle_describe_command(config, &cli.inputs, output, quiet)
        }
        Commands::Order(args) => commands::handle_order_command(args),
    }
}

/// Report of a failed run for stderr, with the full cause chain
pub fn error_report(error: &anyhow::Error) -> String {
    format!("{} {:#}", "Error:".bright_red().bold(), error)
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Dereference(DereferenceArgs::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::almanac::TableName;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_dereference() {
        let cli = Cli::try_parse_from(["almanac", "--agents", "a.json"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.inputs.agents, Some(PathBuf::from("a.json")));
        assert!(matches!(cli.command.unwrap_or_default(), Commands::Dereference(_)));
    }

    #[test]
    fn test_output_without_subcommand() {
        let cli = Cli::try_parse_from(["almanac", "--output", "release.json"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.output, Some(PathBuf::from("release.json")));
    }

    #[test]
    fn test_output_after_subcommand() {
        let cli = Cli::try_parse_from(["almanac", "dereference", "-o", "release.json"]).unwrap();
        assert_eq!(cli.output, Some(PathBuf::from("release.json")));

        let cli =
            Cli::try_parse_from(["almanac", "populate-descriptions", "--output", "s.json"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::PopulateDescriptions)));
        assert_eq!(cli.output, Some(PathBuf::from("s.json")));
    }

    #[test]
    fn test_input_flags_are_global() {
        let cli = Cli::try_parse_from([
            "almanac",
            "dereference",
            "--therapy-groups",
            "tg.json",
            "--root",
            "indications",
        ])
        .unwrap();

        assert_eq!(cli.inputs.therapy_groups, Some(PathBuf::from("tg.json")));
        let Some(Commands::Dereference(args)) = cli.command else {
            panic!("expected dereference");
        };
        assert_eq!(args.root, TableName::Indications);
    }

    #[test]
    fn test_export_tables() {
        let cli = Cli::try_parse_from([
            "almanac", "export", "--table", "agents", "--table", "codings",
        ])
        .unwrap();
        let Some(Commands::Export(args)) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.tables, vec![TableName::Agents, TableName::Codings]);
    }

    #[test]
    fn test_error_report_states_the_chain_once() {
        let error = anyhow::anyhow!("Propositions has no record with id 99")
            .context("Failed to dereference Statements");

        let report = error_report(&error);

        assert_eq!(
            report
                .matches("Failed to dereference Statements: Propositions has no record with id 99")
                .count(),
            1
        );
        assert!(report.contains("Error:"));
    }

    #[test]
    fn test_log_level() {
        let cli = Cli::try_parse_from(["almanac", "-vv"]).unwrap();
        assert_eq!(cli.log_level(), log::LevelFilter::Debug);
        let cli = Cli::try_parse_from(["almanac", "-q"]).unwrap();
        assert_eq!(cli.log_level(), log::LevelFilter::Error);
        let cli = Cli::try_parse_from(["almanac"]).unwrap();
        assert_eq!(cli.log_level(), log::LevelFilter::Warn);
    }

    #[test]
    fn test_unknown_table_is_rejected() {
        assert!(Cli::try_parse_from(["almanac", "order", "--root", "widgets"]).is_err());
    }
}
