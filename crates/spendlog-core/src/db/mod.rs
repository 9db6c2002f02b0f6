//! Database access layer
//!
//! One SQLite file, one `expenses` table. Every operation opens its own
//! connection and drops it before returning, so nothing is held between
//! user actions.
//!
//! This module is organized by concern:
//! - `expenses` - Expense insert/list/delete
//! - `expense_filter` - History view filter builder
//! - `backup` - Snapshot, restore and auto-backup

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tempfile::TempDir;
use tracing::{debug, info};

use crate::error::Result;

mod backup;
mod expense_filter;
mod expenses;


pub use backup::AutoBackupOutcome;
pub use expense_filter::{ExpenseFilter, FilterResult};

/// Parse a SQLite datetime string into a DateTime<Utc>
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    // SQLite stores as "YYYY-MM-DD HH:MM:SS" format
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

/// Handle to the expense store
#[derive(Debug, Clone)]
pub struct Database {
    /// Path to the database file
    db_path: PathBuf,
    /// Owns the directory of a throwaway database; removed with the last clone
    scratch: Option<Arc<TempDir>>,
}

impl Database {
    /// Open (creating if needed) the database at `path` and ensure the schema exists
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Self {
            db_path: path.as_ref().to_path_buf(),
            scratch: None,
        };
        db.initialize()?;
        Ok(db)
    }

    /// Create a throwaway database in its own temp directory (for testing).
    ///
    /// The directory is deleted when the last clone of the handle is dropped.
    pub fn in_memory() -> Result<Self> {
        let scratch = TempDir::new()?;
        let mut db = Self::open(scratch.path().join("spendlog.db"))?;
        db.scratch = Some(Arc::new(scratch));
        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Open a connection for a single operation
    pub fn conn(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        debug!("Opened connection to {}", self.db_path.display());
        Ok(conn)
    }

    /// Ensure the expenses table exists. Idempotent; safe on every start.
    pub fn initialize(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- AUTOINCREMENT keeps ids strictly increasing and never reused,
            -- even after the newest row is deleted
            CREATE TABLE IF NOT EXISTS expenses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                expense_date TEXT NOT NULL,
                category TEXT NOT NULL,
                subcategory TEXT NOT NULL,
                payment_mode TEXT NOT NULL,
                amount REAL NOT NULL,
                notes TEXT,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(expense_date, id);
            "#,
        )?;

        info!("Database ready at {}", self.db_path.display());
        Ok(())
    }
}
