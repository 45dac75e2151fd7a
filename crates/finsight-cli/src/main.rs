//! Finsight CLI - Transaction intelligence from exported statements
//!
//! Usage:
//!   finsight categorize "STARBUCKS #123"       Suggest a category
//!   finsight learn "Joe's Diner" Dining        Remember a correction
//!   finsight duplicates --file tx.csv          Find likely duplicates
//!   finsight insights --file tx.json -b b.json Ranked spending insights

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;
use commands::Context;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    let ctx = Context::load(cli.config.as_deref(), cli.learned.clone(), cli.json)?;

    match cli.command {
        Commands::Categorize {
            name,
            file,
            tx_type,
        } => commands::cmd_categorize(&ctx, name.as_deref(), file.as_deref(), &tx_type),
        Commands::Learn {
            name,
            category,
            forget,
        } => commands::cmd_learn(&ctx, &name, category.as_deref(), forget),
        Commands::Duplicates { file } => commands::cmd_duplicates(&ctx, &file),
        Commands::Patterns { file } => commands::cmd_patterns(&ctx, &file),
        Commands::Insights { file, budgets } => {
            commands::cmd_insights(&ctx, &file, budgets.as_deref())
        }
        Commands::Daily {
            file,
            date,
            accounts,
            budgets,
        } => commands::cmd_daily(&ctx, &file, date, accounts.as_deref(), budgets.as_deref()),
        Commands::Weekly { file, week_start } => commands::cmd_weekly(&ctx, &file, week_start),
    }
}
