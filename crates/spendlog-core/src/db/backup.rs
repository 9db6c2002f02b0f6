//! Database backup operations
//!
//! Snapshots are taken with `VACUUM INTO`, which produces a consistent,
//! compacted copy of the database file.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use rusqlite::params;
use tempfile::TempDir;
use tracing::{debug, info};

use super::Database;
use crate::backup::{
    generate_backup_name, normalize_backup_name, BackupDestination, BackupInfo, BackupResult,
    PruneResult, RetentionPolicy,
};
use crate::error::{Error, Result};

/// What `auto_backup` decided to do
#[derive(Debug, Clone)]
pub enum AutoBackupOutcome {
    /// A new backup was taken
    Created(BackupResult),
    /// The newest backup is still within the interval
    NotDue { last_backup: DateTime<Utc> },
    /// Nothing recorded yet, so nothing to back up
    Empty,
}

impl Database {
    /// Create a backup of the database
    ///
    /// # Arguments
    /// * `destination` - Where to store the backup
    /// * `backup_name` - Optional name override (defaults to timestamped name).
    ///   Missing `spendlog-` prefix or `.db.gz` suffix is added.
    pub fn create_backup(
        &self,
        destination: &dyn BackupDestination,
        backup_name: Option<&str>,
    ) -> Result<BackupResult> {
        let name = backup_name
            .map(normalize_backup_name)
            .unwrap_or_else(|| generate_backup_name(Utc::now()));

        let expenses = self.count_expenses()?;

        let temp_dir = TempDir::new()
            .map_err(|e| Error::Backup(format!("Failed to create temp dir: {}", e)))?;
        let snapshot = temp_dir.path().join("snapshot.db");

        {
            let conn = self.conn()?;
            conn.execute(
                "VACUUM INTO ?",
                params![snapshot.to_string_lossy().to_string()],
            )
            .map_err(|e| Error::Backup(format!("Snapshot failed: {}", e)))?;
        }
        debug!("Created raw snapshot at: {}", snapshot.display());

        let stored_name = destination.store(&snapshot, &name)?;

        let info = destination
            .list()?
            .into_iter()
            .find(|b| b.name == stored_name)
            .ok_or_else(|| Error::Backup("Backup not found after storing".to_string()))?;

        info!(
            "Backup complete via {}: {} ({} bytes)",
            destination.name(),
            info.name,
            info.size
        );

        Ok(BackupResult { info, expenses })
    }

    /// Take a backup only if the newest one is at least `interval_days` old
    pub fn auto_backup(
        &self,
        destination: &dyn BackupDestination,
        interval_days: i64,
        now: DateTime<Utc>,
    ) -> Result<AutoBackupOutcome> {
        if self.count_expenses()? == 0 {
            return Ok(AutoBackupOutcome::Empty);
        }

        let newest = destination.list()?.into_iter().map(|b| b.created_at).max();
        if let Some(last_backup) = newest {
            if now - last_backup < Duration::days(interval_days) {
                debug!("Auto-backup not due; last backup at {}", last_backup);
                return Ok(AutoBackupOutcome::NotDue { last_backup });
            }
        }

        let result = self.create_backup(destination, Some(&generate_backup_name(now)))?;
        Ok(AutoBackupOutcome::Created(result))
    }

    /// Restore a database from backup
    ///
    /// # Arguments
    /// * `destination` - Where the backup is stored
    /// * `backup_name` - Name of the backup to restore
    /// * `target_path` - Where to restore the database
    /// * `force` - Overwrite existing database if present
    pub fn restore_backup(
        destination: &dyn BackupDestination,
        backup_name: &str,
        target_path: &Path,
        force: bool,
    ) -> Result<()> {
        if target_path.exists() {
            if !force {
                return Err(Error::Backup(format!(
                    "Database already exists at {}. Use force=true to overwrite.",
                    target_path.display()
                )));
            }

            std::fs::remove_file(target_path)
                .map_err(|e| Error::Backup(format!("Failed to remove existing database: {}", e)))?;
        }

        destination.retrieve(backup_name, target_path)?;

        info!("Restored backup to: {}", target_path.display());
        Ok(())
    }

    /// List available backups
    pub fn list_backups(destination: &dyn BackupDestination) -> Result<Vec<BackupInfo>> {
        destination.list()
    }

    /// Prune old backups according to retention policy
    pub fn prune_backups(
        destination: &dyn BackupDestination,
        policy: &RetentionPolicy,
    ) -> Result<PruneResult> {
        destination.prune(policy)
    }
}
