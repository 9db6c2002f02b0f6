//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use spendlog_core::{ExportFormat, SortField, SortOrder};

use crate::commands::MAX_TREND_DAYS;

/// Spendlog - Log what you spend, see where it goes
#[derive(Parser)]
#[command(name = "spendlog")]
#[command(about = "Personal expense tracker backed by a local SQLite file", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path (defaults to `database.path` from the config)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Config override file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Record an expense
    Add(AddArgs),

    /// Show recorded expenses, newest first
    History {
        #[command(flatten)]
        filter: FilterArgs,

        /// Show every matching entry instead of the configured recent count
        #[arg(long)]
        all: bool,
    },

    /// Delete an expense by ID
    Delete {
        /// Expense ID (see `history`)
        id: i64,
    },

    /// Show the spending dashboard
    Stats {
        /// Days of daily trend to show
        #[arg(long, default_value = "14", value_parser = clap::value_parser!(i64).range(0..=MAX_TREND_DAYS))]
        days: i64,
    },

    /// Show month-to-date spending against category budgets
    Budget,

    /// Export expenses to a file
    Export {
        /// Output file (defaults to `database.export_path` from the config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: csv, json (guessed from the file extension if omitted)
        #[arg(short, long)]
        format: Option<ExportFormat>,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Import expenses from a CSV export
    Import {
        /// CSV file to import
        file: PathBuf,

        /// Parse and validate only, don't write anything
        #[arg(long)]
        dry_run: bool,
    },

    /// List configured categories, subcategories and payment modes
    Categories,

    /// Backup management
    Backup {
        #[command(subcommand)]
        action: BackupAction,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },

    /// Interactive session (add, browse, filter, delete)
    Shell,
}

/// Fields of a new expense
#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Amount spent
    #[arg(short, long, allow_negative_numbers = true)]
    pub amount: f64,

    /// Category (case-insensitive)
    #[arg(short, long)]
    pub category: String,

    /// Subcategory (defaults to "Other" when the category offers it)
    #[arg(short, long)]
    pub subcategory: Option<String>,

    /// Payment mode (defaults to the first configured mode)
    #[arg(short, long)]
    pub payment: Option<String>,

    /// Date of the expense, YYYY-MM-DD (defaults to today)
    #[arg(short, long)]
    pub date: Option<NaiveDate>,

    /// Free-text note
    #[arg(short, long)]
    pub note: Option<String>,
}

/// History filter options shared by `history` and `export`
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only these categories (repeatable)
    #[arg(short = 'c', long = "category")]
    pub categories: Vec<String>,

    /// First day to include, YYYY-MM-DD
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last day to include, YYYY-MM-DD
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Sort by: date, amount, category
    #[arg(long)]
    pub sort: Option<SortField>,

    /// Sort order: asc, desc
    #[arg(long)]
    pub order: Option<SortOrder>,

    /// Maximum number of entries
    #[arg(short, long)]
    pub limit: Option<usize>,
}

#[derive(Subcommand)]
pub enum BackupAction {
    /// Create a new backup
    Create {
        /// Custom backup name (defaults to timestamped name)
        #[arg(long)]
        name: Option<String>,

        /// Backup directory (defaults to `backup.folder` from the config)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// List available backups
    List {
        /// Backup directory (defaults to `backup.folder` from the config)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Restore from a backup
    Restore {
        /// Backup name to restore
        name: String,

        /// Backup directory (defaults to `backup.folder` from the config)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Overwrite existing database
        #[arg(long)]
        force: bool,
    },

    /// Remove old backups, keeping the newest ones
    Prune {
        /// Number of backups to keep (defaults to `backup.keep` from the config)
        #[arg(long)]
        keep: Option<usize>,

        /// Backup directory (defaults to `backup.folder` from the config)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print where the config override file is read from
    Path,

    /// Print the resolved configuration
    Show,
}
