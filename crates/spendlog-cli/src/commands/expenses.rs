//! Expense commands (add, history, delete)

use anyhow::Result;
use chrono::NaiveDate;
use spendlog_core::{
    Config, Database, Error as CoreError, ExpenseFilter, NewExpense, SortField, SortOrder,
};

use super::truncate;
use crate::cli::{AddArgs, FilterArgs};

/// Owned history filter. Outlives a single command so the interactive
/// session can keep refining it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryQuery {
    pub categories: Vec<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
    pub limit: Option<usize>,
}

impl HistoryQuery {
    /// Config defaults: configured sort, capped to the recent-entry count
    pub fn new(config: &Config) -> Self {
        Self {
            sort_field: config.default_sort,
            sort_order: config.default_sort_order,
            limit: Some(config.recent_entries),
            ..Self::default()
        }
    }

    /// Apply command-line filter flags over the config defaults.
    ///
    /// `default_limit` applies when `--limit` is not given.
    pub fn from_args(config: &Config, args: &FilterArgs, default_limit: Option<usize>) -> Self {
        Self {
            categories: args
                .categories
                .iter()
                .map(|c| resolve_category_name(config, c))
                .collect(),
            from: args.from,
            to: args.to,
            sort_field: args.sort.unwrap_or(config.default_sort),
            sort_order: args.order.unwrap_or(config.default_sort_order),
            limit: args.limit.or(default_limit),
        }
    }

    pub fn filter(&self) -> ExpenseFilter<'_> {
        ExpenseFilter::new()
            .categories(&self.categories)
            .from(self.from)
            .to(self.to)
            .sort_field(self.sort_field)
            .sort_order(self.sort_order)
            .limit(self.limit)
    }

    /// One-line summary of the active conditions
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if !self.categories.is_empty() {
            parts.push(format!("categories: {}", self.categories.join(", ")));
        }
        match (self.from, self.to) {
            (Some(from), Some(to)) => parts.push(format!("dates: {} to {}", from, to)),
            (Some(from), None) => parts.push(format!("from: {}", from)),
            (None, Some(to)) => parts.push(format!("until: {}", to)),
            (None, None) => {}
        }
        parts.push(format!("sort: {} {}", self.sort_field, self.sort_order));
        if let Some(limit) = self.limit {
            parts.push(format!("limit: {}", limit));
        }
        parts.join(" | ")
    }
}

/// Unknown names pass through so old records stay reachable
fn resolve_category_name(config: &Config, name: &str) -> String {
    config
        .resolve_category(name)
        .map(String::from)
        .unwrap_or_else(|| name.trim().to_string())
}

/// Turn add arguments into a validated expense.
///
/// Names are matched case-insensitively against the config and stored with
/// the configured spelling.
pub fn build_new_expense(config: &Config, args: &AddArgs) -> spendlog_core::Result<NewExpense> {
    let category = config.resolve_category(&args.category).ok_or_else(|| {
        CoreError::Validation(format!(
            "Unknown category '{}'. Choose one of: {}",
            args.category,
            config.category_names().join(", ")
        ))
    })?;

    let subcategory = match args.subcategory.as_deref() {
        Some(sub) => config
            .resolve_subcategory(category, sub)
            .unwrap_or(sub)
            .to_string(),
        None => {
            let choices = config.subcategories_for(category);
            if choices.contains(&"Other") {
                "Other".to_string()
            } else {
                return Err(CoreError::Validation(format!(
                    "Pick a subcategory for {}: {}",
                    category,
                    choices.join(", ")
                )));
            }
        }
    };

    let payment_mode = match args.payment.as_deref() {
        Some(mode) => config
            .resolve_payment_mode(mode)
            .unwrap_or(mode)
            .to_string(),
        None => config
            .payment_modes
            .first()
            .cloned()
            .ok_or_else(|| CoreError::Config("No payment modes configured".to_string()))?,
    };

    config.check_choices(category, &subcategory, &payment_mode)?;

    let expense = NewExpense {
        date: args.date.unwrap_or_else(|| config.now().date()),
        category: category.to_string(),
        subcategory,
        payment_mode,
        amount: args.amount,
        note: args.note.clone(),
    };
    expense.validate()?;

    Ok(expense)
}

/// Record an expense. Validation problems are reported inline and nothing
/// is written; returns the new ID on success.
pub fn cmd_add(db: &Database, config: &Config, args: &AddArgs) -> Result<Option<i64>> {
    let expense = match build_new_expense(config, args) {
        Ok(expense) => expense,
        Err(e @ (CoreError::Validation(_) | CoreError::Config(_))) => {
            println!("❌ {}", e);
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let id = db.insert_expense(&expense)?;

    let emoji = config.emoji_for(&expense.category);
    println!(
        "✅ Recorded #{}: {} {} {} / {} via {} on {}",
        id,
        config.money(expense.amount),
        emoji,
        expense.category,
        expense.subcategory,
        expense.payment_mode,
        expense.date.format(&config.date_format)
    );

    Ok(Some(id))
}

/// Show the filtered history. Returns the count and total of every matching
/// expense, including rows past the display limit.
pub fn cmd_history(db: &Database, config: &Config, query: &HistoryQuery) -> Result<(i64, f64)> {
    let filter = query.filter();
    let expenses = db.search_expenses(&filter)?;

    if expenses.is_empty() {
        if !filter.is_filtered() {
            println!("No expenses recorded yet. Add one with:");
            println!("  spendlog add --amount 120 --category Outing --subcategory Cafe");
        } else {
            println!("No expenses match the current filter.");
        }
        return Ok((0, 0.0));
    }

    println!();
    println!("📝 Expense History");
    println!("   ─────────────────────────────────────────────────────────────────────────────");

    for e in &expenses {
        println!(
            "   {:>5} │ {} │ {:>12} │ {:<18} │ {:<16} │ {:<14} │ {}",
            e.id,
            e.date.format(&config.date_format),
            config.money(e.amount),
            truncate(&format!("{} {}", config.emoji_for(&e.category), e.category), 18),
            truncate(&e.subcategory, 16),
            truncate(&e.payment_mode, 14),
            truncate(e.note.as_deref().unwrap_or(""), 30)
        );
    }

    let (count, total) = db.expense_totals(&filter)?;
    println!("   ─────────────────────────────────────────────────────────────────────────────");
    println!("   {} entries │ Total {}", count, config.money(total));
    if (expenses.len() as i64) < count {
        println!(
            "   (showing {} of {}; use --all or --limit for more)",
            expenses.len(),
            count
        );
    }

    Ok((count, total))
}

/// Delete an expense. An unknown ID is reported and left alone.
pub fn cmd_delete(db: &Database, config: &Config, id: i64) -> Result<bool> {
    let existing = db.get_expense(id)?;

    if !db.delete_expense(id)? {
        println!("No expense with ID {} (nothing deleted)", id);
        return Ok(false);
    }

    match existing {
        Some(e) => println!(
            "🗑️  Deleted #{}: {} {} / {} on {}",
            id,
            config.money(e.amount),
            e.category,
            e.subcategory,
            e.date.format(&config.date_format)
        ),
        None => println!("🗑️  Deleted #{}", id),
    }

    Ok(true)
}
