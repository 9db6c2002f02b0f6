//! Expense operations

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::expense_filter::ExpenseFilter;
use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::{Expense, NewExpense};

const EXPENSE_COLUMNS: &str =
    "e.id, e.expense_date, e.category, e.subcategory, e.payment_mode, e.amount, e.notes, e.created_at";

impl Database {
    /// Insert an expense and return its new id.
    ///
    /// The amount is not re-checked here; callers run `NewExpense::validate` first.
    pub fn insert_expense(&self, expense: &NewExpense) -> Result<i64> {
        let conn = self.conn()?;
        let id = insert_with_conn(&conn, expense)?;

        info!(
            "Recorded expense {}: {} {} / {}",
            id, expense.amount, expense.category, expense.subcategory
        );
        Ok(id)
    }

    /// Insert several expenses in one transaction, returning their ids in order.
    ///
    /// Either every row is written or none is.
    pub fn insert_expenses(&self, expenses: &[NewExpense]) -> Result<Vec<i64>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let mut ids = Vec::with_capacity(expenses.len());
        for expense in expenses {
            ids.push(insert_with_conn(&tx, expense)?);
        }
        tx.commit()?;

        info!("Recorded {} expenses", ids.len());
        Ok(ids)
    }

    /// Every expense, newest date first, later insertions first within a day
    pub fn list_expenses(&self) -> Result<Vec<Expense>> {
        self.search_expenses(&ExpenseFilter::new())
    }

    /// Expenses matching a history filter
    pub fn search_expenses(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>> {
        let conn = self.conn()?;

        let built = filter.build();
        let sql = built.build_select_query(EXPENSE_COLUMNS);
        debug!("search_expenses: {}", sql);

        let mut stmt = conn.prepare(&sql)?;
        let expenses = stmt
            .query_map(built.params_refs().as_slice(), Self::row_to_expense)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(expenses)
    }

    /// Count and total of every expense the filter matches, ignoring its limit
    pub fn expense_totals(&self, filter: &ExpenseFilter) -> Result<(i64, f64)> {
        let conn = self.conn()?;

        let built = filter.clone().limit(None).build();
        let sql = format!(
            "SELECT COUNT(*), COALESCE(SUM(e.amount), 0) FROM expenses e {}",
            built.where_clause
        );
        debug!("expense_totals: {}", sql);

        let totals = conn.query_row(&sql, built.params_refs().as_slice(), |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?;
        Ok(totals)
    }

    /// Get a single expense by ID
    pub fn get_expense(&self, id: i64) -> Result<Option<Expense>> {
        let conn = self.conn()?;
        let expense = conn
            .query_row(
                &format!("SELECT {} FROM expenses e WHERE e.id = ?", EXPENSE_COLUMNS),
                params![id],
                Self::row_to_expense,
            )
            .optional()?;
        Ok(expense)
    }

    /// Delete an expense by ID.
    ///
    /// Returns whether a row was removed; an unknown id is not an error.
    pub fn delete_expense(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM expenses WHERE id = ?", params![id])?;

        if removed > 0 {
            info!("Deleted expense {}", id);
        } else {
            debug!("Delete of unknown expense {} ignored", id);
        }
        Ok(removed > 0)
    }

    /// Count all expenses
    pub fn count_expenses(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))?;
        Ok(count)
    }

    pub(crate) fn row_to_expense(row: &rusqlite::Row) -> rusqlite::Result<Expense> {
        let date_str: String = row.get(1)?;
        let created_at_str: Option<String> = row.get(7)?;

        let date = chrono::NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(Expense {
            id: row.get(0)?,
            date,
            category: row.get(2)?,
            subcategory: row.get(3)?,
            payment_mode: row.get(4)?,
            amount: row.get(5)?,
            note: row.get(6)?,
            created_at: created_at_str
                .as_deref()
                .map(parse_datetime)
                .unwrap_or_else(chrono::Utc::now),
        })
    }
}

fn insert_with_conn(conn: &Connection, expense: &NewExpense) -> Result<i64> {
    conn.execute(
        r#"
        INSERT INTO expenses (expense_date, category, subcategory, payment_mode, amount, notes)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
        params![
            expense.date.to_string(),
            expense.category,
            expense.subcategory,
            expense.payment_mode,
            expense.amount,
            expense.normalized_note(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}
