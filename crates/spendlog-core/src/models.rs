//! Domain models for spendlog

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A logged expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Store-assigned, strictly increasing, never reused
    pub id: i64,
    pub date: NaiveDate,
    pub category: String,
    pub subcategory: String,
    pub payment_mode: String,
    pub amount: f64,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An expense to be recorded (before DB insertion)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub date: NaiveDate,
    pub category: String,
    pub subcategory: String,
    pub payment_mode: String,
    pub amount: f64,
    pub note: Option<String>,
}

impl NewExpense {
    /// Check the amount before the record reaches the database.
    ///
    /// Category, subcategory and payment mode are checked against the
    /// configured choices by `Config::check_choices`, not here.
    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(Error::Validation(format!(
                "Amount must be greater than zero (got {})",
                self.amount
            )));
        }
        Ok(())
    }

    /// Blank notes are stored as NULL
    pub fn normalized_note(&self) -> Option<&str> {
        self.note
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

impl From<&Expense> for NewExpense {
    fn from(e: &Expense) -> Self {
        Self {
            date: e.date,
            category: e.category.clone(),
            subcategory: e.subcategory.clone(),
            payment_mode: e.payment_mode.clone(),
            amount: e.amount,
            note: e.note.clone(),
        }
    }
}

/// Column used to order the history view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Date,
    Amount,
    Category,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Amount => "amount",
            Self::Category => "category",
        }
    }
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "date" => Ok(Self::Date),
            "amount" => Ok(Self::Amount),
            "category" => Ok(Self::Category),
            _ => Err(format!(
                "Unknown sort field: {} (valid: date, amount, category)",
                s
            )),
        }
    }
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(format!("Unknown sort order: {} (valid: asc, desc)", s)),
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Dashboard figures over trailing windows
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub total: f64,
    pub today: f64,
    pub last7: f64,
    pub last30: f64,
    pub avg_daily_30: f64,
}

/// Total spent in one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
    pub count: usize,
}

/// Total spent with one payment mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentModeTotal {
    pub payment_mode: String,
    pub amount: f64,
    pub count: usize,
}

/// Total spent on one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub amount: f64,
}

/// Month-to-date spending against a category's monthly budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub category: String,
    pub limit: f64,
    pub spent: f64,
    pub remaining: f64,
    /// Share of the limit used, in percent
    pub percent_used: f64,
    pub over_budget: bool,
}

/// Window a spending limit applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitWindow {
    Daily,
    Weekly,
    Monthly,
}

impl LimitWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl std::fmt::Display for LimitWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A spending limit that has been exceeded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitAlert {
    pub window: LimitWindow,
    pub limit: f64,
    pub spent: f64,
}
