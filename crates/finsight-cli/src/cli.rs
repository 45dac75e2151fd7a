//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Finsight - Transaction intelligence from your exported statements
#[derive(Parser)]
#[command(name = "finsight")]
#[command(about = "Categories, duplicates, spending insights and notifications", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Pipeline config file (defaults to the data dir override, then built-in values)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Learned category associations file
    #[arg(long, global = true)]
    pub learned: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Suggest categories for a merchant name, or for uncategorized transactions in a file
    Categorize {
        /// Merchant or transaction name
        name: Option<String>,

        /// Transactions file (.json or .csv)
        #[arg(short, long, conflicts_with = "name")]
        file: Option<PathBuf>,

        /// Transaction type: expense or income
        #[arg(short = 't', long = "type", default_value = "expense")]
        tx_type: String,
    },

    /// Teach the classifier a category for a transaction name
    Learn {
        /// Transaction name as it appears on statements
        name: String,

        /// Category to use for this name
        #[arg(required_unless_present = "forget")]
        category: Option<String>,

        /// Remove the learned category instead
        #[arg(long)]
        forget: bool,
    },

    /// Find likely duplicate transactions
    Duplicates {
        /// Transactions file (.json or .csv)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Per-category spending patterns and outliers
    Patterns {
        /// Transactions file (.json or .csv)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Ranked spending insights
    Insights {
        /// Transactions file (.json or .csv)
        #[arg(short, long)]
        file: PathBuf,

        /// Budgets file (.json or .csv with category,limit,spent)
        #[arg(short, long)]
        budgets: Option<PathBuf>,
    },

    /// Daily summary notifications
    Daily {
        /// Transactions file (.json or .csv)
        #[arg(short, long)]
        file: PathBuf,

        /// Day to summarize (YYYY-MM-DD, defaults to the latest transaction date)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Account balances file (.json or .csv with name,balance)
        #[arg(short, long)]
        accounts: Option<PathBuf>,

        /// Budgets file (.json or .csv with category,limit,spent)
        #[arg(short, long)]
        budgets: Option<PathBuf>,
    },

    /// Week-over-week notifications
    Weekly {
        /// Transactions file (.json or .csv)
        #[arg(short, long)]
        file: PathBuf,

        /// First day of the current week (defaults to 6 days before the latest transaction)
        #[arg(short, long)]
        week_start: Option<NaiveDate>,
    },
}
