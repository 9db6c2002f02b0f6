//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `resolve_db_path` / `open_db` - Shared utilities to locate and open the database
//! - `run_auto_backup` - Periodic backup check run before commands that write
//! - `cmd_init` - Initialize the database

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use spendlog_core::backup::{LocalDestination, RetentionPolicy};
use spendlog_core::{AutoBackupOutcome, Config, Database};
use tracing::{info, warn};

/// `--db` wins over `database.path` from the config
pub fn resolve_db_path(cli_db: Option<&Path>, config: &Config) -> PathBuf {
    cli_db
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.db_path.clone())
}

/// Open the database, creating the expenses table if needed
pub fn open_db(db_path: &Path) -> Result<Database> {
    Database::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))
}

/// Take a backup if backups are enabled and the newest one is older than the
/// configured interval. Failures are logged, never fatal.
pub fn run_auto_backup(db: &Database, config: &Config) -> Option<AutoBackupOutcome> {
    if !config.backup.enabled {
        return None;
    }

    let outcome = LocalDestination::new(config.backup_dir()).and_then(|destination| {
        let outcome = db.auto_backup(&destination, config.backup.interval_days, Utc::now())?;
        if matches!(outcome, AutoBackupOutcome::Created(_)) {
            Database::prune_backups(&destination, &RetentionPolicy::keep_last(config.backup.keep))?;
        }
        Ok(outcome)
    });

    match outcome {
        Ok(outcome) => {
            if let AutoBackupOutcome::Created(ref result) = outcome {
                info!("Auto-backup created: {}", result.info.name);
            }
            Some(outcome)
        }
        Err(e) => {
            warn!("Auto-backup failed: {}", e);
            None
        }
    }
}

pub fn cmd_init(db_path: &Path, config: &Config) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path)?;
    let count = db.count_expenses().context("Failed to count expenses")?;

    match &config.source {
        Some(path) => println!("   Config: {}", path.display()),
        None => println!("   Config: built-in defaults"),
    }
    println!(
        "   Categories: {}, payment modes: {}",
        config.categories.len(),
        config.payment_modes.len()
    );
    if config.backup.enabled {
        println!(
            "   💾 Auto-backup every {} day(s) to {}",
            config.backup.interval_days,
            config.backup_dir().display()
        );
    }
    if count > 0 {
        println!("   Existing expenses: {}", count);
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Record an expense: spendlog add --amount 120 --category Outing --subcategory Cafe");
    println!("  2. See the dashboard: spendlog stats");

    Ok(())
}
