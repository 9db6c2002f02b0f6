//! Spendlog Core Library
//!
//! Shared functionality for the spendlog expense tracker:
//! - SQLite expense store (one connection per operation)
//! - Aggregation: headline totals, category/payment/day breakdowns, budgets
//! - CSV/JSON export and CSV re-import
//! - Layered TOML configuration (categories, payment modes, limits, timezone)
//! - Backup system with pluggable destinations

pub mod backup;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod stats;

pub use backup::{
    BackupDestination, BackupInfo, BackupResult, LocalDestination, PruneResult, RetentionPolicy,
};
pub use config::{BackupConfig, CategoryConfig, Config, LimitConfig};
pub use db::{AutoBackupOutcome, Database, ExpenseFilter};
pub use error::{Error, Result};
pub use export::{export, export_to_csv, export_to_json, read_csv, ExportFormat};
pub use models::{
    BudgetStatus, CategoryTotal, DailyTotal, Expense, LimitAlert, LimitWindow, NewExpense,
    PaymentModeTotal, SortField, SortOrder, Summary,
};
