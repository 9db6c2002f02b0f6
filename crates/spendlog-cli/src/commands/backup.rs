//! Backup management commands

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use spendlog_core::backup::{LocalDestination, RetentionPolicy};
use spendlog_core::{Config, Database};

fn backup_dir(config: &Config, dir: Option<PathBuf>) -> PathBuf {
    dir.unwrap_or_else(|| config.backup_dir())
}

fn open_destination(backup_dir: &Path) -> Result<LocalDestination> {
    LocalDestination::new(backup_dir).with_context(|| {
        format!(
            "Failed to access backup directory: {}",
            backup_dir.display()
        )
    })
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Create a new backup
pub fn cmd_backup_create(
    db: &Database,
    config: &Config,
    name: Option<&str>,
    dir: Option<PathBuf>,
) -> Result<()> {
    let backup_dir = backup_dir(config, dir);
    let destination = open_destination(&backup_dir)?;

    println!("Creating backup...");

    let result = db
        .create_backup(&destination, name)
        .context("Failed to create backup")?;

    println!("✅ Backup created: {}", result.info.name);
    println!("   Location: {}", result.info.path);
    println!("   Size: {}", format_size(result.info.size));
    println!("   Expenses: {}", result.expenses);
    if result.info.compressed {
        println!("   📦 Compressed");
    }

    Ok(())
}

/// List available backups
pub fn cmd_backup_list(config: &Config, dir: Option<PathBuf>) -> Result<()> {
    let backup_dir = backup_dir(config, dir);

    if !backup_dir.exists() {
        println!("No backups found (backup directory does not exist)");
        println!("Directory: {}", backup_dir.display());
        return Ok(());
    }

    let destination = open_destination(&backup_dir)?;
    let backups = Database::list_backups(&destination).context("Failed to list backups")?;

    if backups.is_empty() {
        println!("No backups found");
        println!("Directory: {}", backup_dir.display());
        return Ok(());
    }

    println!("Available backups ({}):", backup_dir.display());
    println!();
    println!("{:<38} {:>10} {:>17}", "NAME", "SIZE", "CREATED");
    println!("{}", "-".repeat(67));

    for backup in backups {
        println!(
            "{:<38} {:>10} {:>17}",
            backup.name,
            format_size(backup.size),
            backup.created_at.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}

/// Restore from a backup
pub fn cmd_backup_restore(
    db_path: &Path,
    config: &Config,
    name: &str,
    dir: Option<PathBuf>,
    force: bool,
) -> Result<()> {
    let backup_dir = backup_dir(config, dir);
    let destination = open_destination(&backup_dir)?;

    let backups = Database::list_backups(&destination)?;
    let backup = backups
        .iter()
        .find(|b| b.name == name)
        .ok_or_else(|| anyhow::anyhow!("Backup not found: {}", name))?;

    if db_path.exists() && !force {
        anyhow::bail!(
            "Database already exists at {}.\nUse --force to overwrite.",
            db_path.display()
        );
    }

    if db_path.exists() {
        println!(
            "⚠️  This will overwrite the existing database at {}",
            db_path.display()
        );
        if !confirm("Continue?")? {
            println!("Cancelled");
            return Ok(());
        }
    }

    println!("Restoring from backup: {}", backup.name);

    Database::restore_backup(&destination, name, db_path, force)
        .context("Failed to restore backup")?;

    // Verify the restored database
    let restored = Database::open(db_path).context("Restored database could not be opened")?;
    let count = restored.count_expenses()?;

    println!("✅ Database restored from: {}", backup.name);
    println!("   Location: {}", db_path.display());
    println!("   Expenses: {}", count);

    Ok(())
}

/// Prune old backups according to retention policy
pub fn cmd_backup_prune(
    config: &Config,
    keep: Option<usize>,
    dir: Option<PathBuf>,
    yes: bool,
) -> Result<()> {
    let keep = keep.unwrap_or(config.backup.keep);
    let backup_dir = backup_dir(config, dir);
    let destination = open_destination(&backup_dir)?;

    let backups = Database::list_backups(&destination)?;

    if backups.len() <= keep {
        println!(
            "Nothing to prune. {} backup(s) found, keeping {}.",
            backups.len(),
            keep
        );
        return Ok(());
    }

    if !yes {
        println!(
            "This will delete {} backup(s), keeping the {} most recent:",
            backups.len() - keep,
            keep
        );
        println!();
        for backup in backups.iter().skip(keep) {
            println!("  - {} ({})", backup.name, format_size(backup.size));
        }
        println!();
        if !confirm("Continue?")? {
            println!("Cancelled");
            return Ok(());
        }
    }

    let result = Database::prune_backups(&destination, &RetentionPolicy::keep_last(keep))
        .context("Failed to prune backups")?;

    println!("✅ Pruned {} backup(s)", result.deleted_count);
    println!("   Freed: {}", format_size(result.bytes_freed));
    println!("   Remaining: {} backup(s)", result.retained_count);

    Ok(())
}

/// Format a byte size as human-readable
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
