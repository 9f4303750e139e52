//! Order command handler: print the resolution order

use anyhow::Result;
use clap::Args;
use colored::*;

use crate::almanac::{DependencyGraph, TableName, almanac_plans};

#[derive(Debug, Clone, Args)]
pub struct OrderArgs {
    /// Only show the tables needed for this one
    #[arg(long)]
    pub root: Option<TableName>,
}

pub fn handle_order_command(args: OrderArgs) -> Result<()> {
    let plans = almanac_plans();
    let graph = DependencyGraph::build(plans.values());

    let order = match args.root {
        Some(root) => graph.resolution_order(root)?,
        None => graph.topological_sort()?,
    };

    for (position, table) in order.iter().enumerate() {
        let dependencies = graph
            .dependencies_of(*table)
            .iter()
            .map(|t| t.label())
            .collect::<Vec<_>>();

        if dependencies.is_empty() {
            println!("{:>2}. {}", position + 1, table.label().bold());
        } else {
            println!(
                "{:>2}. {} {}",
                position + 1,
                table.label().bold(),
                format!("<- {}", dependencies.join(", ")).dimmed()
            );
        }
    }
    Ok(())
}
