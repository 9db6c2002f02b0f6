//! Expense filter builder for constructing dynamic SQL queries
//!
//! Used by the history view and by filtered exports.

use chrono::NaiveDate;

use crate::models::{SortField, SortOrder};

/// Builder for constructing history filters
///
/// The lifetime `'query` is how long the borrowed category names must
/// remain valid.
#[derive(Debug, Default, Clone)]
pub struct ExpenseFilter<'query> {
    /// Match any of these categories; empty means all
    pub categories: &'query [String],
    /// Inclusive on both ends, compared as calendar days
    pub date_range: (Option<NaiveDate>, Option<NaiveDate>),
    pub sort_field: SortField,
    pub sort_order: SortOrder,
    pub limit: Option<usize>,
}

/// Result of building a filter - contains SQL components and parameters
pub struct FilterResult {
    /// WHERE clause including "WHERE" keyword (empty if no conditions)
    pub where_clause: String,
    /// ORDER BY clause including "ORDER BY" keyword
    pub order_clause: String,
    /// LIMIT clause (empty if unlimited)
    pub limit_clause: String,
    /// Parameters for the query (boxed for rusqlite compatibility)
    pub params: Vec<Box<dyn rusqlite::ToSql>>,
}

impl<'query> ExpenseFilter<'query> {
    /// Create a new filter builder (date descending, no conditions)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set category filter
    pub fn categories(mut self, categories: &'query [String]) -> Self {
        self.categories = categories;
        self
    }

    /// Set lower date bound (inclusive)
    pub fn from(mut self, date: Option<NaiveDate>) -> Self {
        self.date_range.0 = date;
        self
    }

    /// Set upper date bound (inclusive)
    pub fn to(mut self, date: Option<NaiveDate>) -> Self {
        self.date_range.1 = date;
        self
    }

    /// Set sort field
    pub fn sort_field(mut self, field: SortField) -> Self {
        self.sort_field = field;
        self
    }

    /// Set sort order
    pub fn sort_order(mut self, order: SortOrder) -> Self {
        self.sort_order = order;
        self
    }

    /// Cap the number of rows returned
    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// True when the filter narrows the record set
    pub fn is_filtered(&self) -> bool {
        !self.categories.is_empty() || self.date_range.0.is_some() || self.date_range.1.is_some()
    }

    /// Build the filter components
    pub fn build(&self) -> FilterResult {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if !self.categories.is_empty() {
            let placeholders: Vec<&str> = self.categories.iter().map(|_| "?").collect();
            conditions.push(format!("e.category IN ({})", placeholders.join(", ")));
            for category in self.categories {
                params.push(Box::new(category.clone()));
            }
        }

        // Dates are stored as YYYY-MM-DD, so string comparison is calendar order
        if let Some(from) = self.date_range.0 {
            conditions.push("e.expense_date >= ?".to_string());
            params.push(Box::new(from.to_string()));
        }
        if let Some(to) = self.date_range.1 {
            conditions.push("e.expense_date <= ?".to_string());
            params.push(Box::new(to.to_string()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let order_column = match self.sort_field {
            SortField::Date => "e.expense_date",
            SortField::Amount => "e.amount",
            SortField::Category => "e.category",
        };
        let order_clause = format!(
            "ORDER BY {} {}, e.id DESC",
            order_column,
            self.sort_order.as_sql()
        );

        let limit_clause = match self.limit {
            Some(n) => {
                params.push(Box::new(n as i64));
                "LIMIT ?".to_string()
            }
            None => String::new(),
        };

        FilterResult {
            where_clause,
            order_clause,
            limit_clause,
            params,
        }
    }
}

impl FilterResult {
    /// Build a SELECT over the expense columns
    pub fn build_select_query(&self, columns: &str) -> String {
        format!(
            "SELECT {} FROM expenses e {} {} {}",
            columns, self.where_clause, self.order_clause, self.limit_clause
        )
    }

    /// Get parameter references for query execution
    pub fn params_refs(&self) -> Vec<&dyn rusqlite::ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}
