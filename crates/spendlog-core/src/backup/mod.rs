//! Database backups
//!
//! A backup is a consistent copy of the expense database taken with
//! `VACUUM INTO`, gzip-compressed by the destination.
//!
//! - `BackupDestination` trait defines the interface for storage backends
//! - `LocalDestination` stores backups in a local directory
//!
//! File naming: `spendlog-YYYY-MM-DD-HHMMSS.db.gz`

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

mod local;

pub use local::LocalDestination;

const BACKUP_PREFIX: &str = "spendlog-";

/// Information about a backup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupInfo {
    /// Backup filename
    pub name: String,
    /// Full path
    pub path: String,
    /// Size in bytes
    pub size: u64,
    /// When the backup was created
    pub created_at: DateTime<Utc>,
    /// Whether the backup is compressed
    pub compressed: bool,
}

/// Result of a backup operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupResult {
    /// Information about the created backup
    pub info: BackupInfo,
    /// Number of expenses in backup
    pub expenses: i64,
}

/// Result of a prune operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PruneResult {
    /// Number of backups deleted
    pub deleted_count: usize,
    /// Names of deleted backups
    pub deleted_names: Vec<String>,
    /// Number of backups retained
    pub retained_count: usize,
    /// Total bytes freed
    pub bytes_freed: u64,
}

/// Backup retention policy: keep the newest `keep` backups
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetentionPolicy {
    pub keep: usize,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self { keep: 10 }
    }
}

impl RetentionPolicy {
    /// Create a simple policy keeping last N backups
    pub fn keep_last(n: usize) -> Self {
        Self { keep: n }
    }
}

/// Trait for backup storage destinations
pub trait BackupDestination {
    /// Human-readable name for this destination
    fn name(&self) -> &str;

    /// Store a backup file
    ///
    /// Takes a local file path and stores it in the destination.
    /// Returns the stored name for the backup.
    fn store(&self, local_path: &Path, backup_name: &str) -> Result<String>;

    /// Copy a backup to the specified local path, decompressing if needed
    fn retrieve(&self, backup_name: &str, local_path: &Path) -> Result<()>;

    /// List all backups in this destination, newest first
    fn list(&self) -> Result<Vec<BackupInfo>>;

    /// Delete a backup
    fn delete(&self, backup_name: &str) -> Result<()>;

    /// Apply retention policy and delete old backups
    fn prune(&self, policy: &RetentionPolicy) -> Result<PruneResult> {
        let mut backups = self.list()?;
        backups.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut deleted_names = Vec::new();
        let mut bytes_freed = 0u64;

        for backup in backups.iter().skip(policy.keep) {
            if let Err(e) = self.delete(&backup.name) {
                tracing::warn!("Failed to delete backup {}: {}", backup.name, e);
                continue;
            }
            bytes_freed += backup.size;
            deleted_names.push(backup.name.clone());
        }

        let retained_count = backups.len().saturating_sub(deleted_names.len());

        Ok(PruneResult {
            deleted_count: deleted_names.len(),
            deleted_names,
            retained_count,
            bytes_freed,
        })
    }
}

/// Generate a backup filename for the given time
pub fn generate_backup_name(at: DateTime<Utc>) -> String {
    format!("{}{}.db.gz", BACKUP_PREFIX, at.format("%Y-%m-%d-%H%M%S"))
}

/// Give a custom backup name the prefix and suffix that `list` recognises
pub fn normalize_backup_name(name: &str) -> String {
    let name = name.trim();
    let name = if name.starts_with(BACKUP_PREFIX) {
        name.to_string()
    } else {
        format!("{}{}", BACKUP_PREFIX, name)
    };

    if name.ends_with(".db.gz") {
        name
    } else if let Some(stem) = name.strip_suffix(".db") {
        format!("{}.db.gz", stem)
    } else {
        format!("{}.db.gz", name)
    }
}

/// Parse backup creation time from filename
pub fn parse_backup_time(name: &str) -> Option<DateTime<Utc>> {
    // Expected format: spendlog-YYYY-MM-DD-HHMMSS.db.gz
    let name = name.strip_prefix(BACKUP_PREFIX)?;
    let name = name
        .strip_suffix(".db.gz")
        .or_else(|| name.strip_suffix(".db"))?;

    chrono::NaiveDateTime::parse_from_str(name, "%Y-%m-%d-%H%M%S")
        .ok()
        .map(|dt| dt.and_utc())
}

/// Default backup directory
pub fn default_backup_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("spendlog")
        .join("backups")
}
