//! Spending statistics
//!
//! Pure functions over a slice of expenses. The reference time is always
//! passed in; nothing here reads the clock. Comparisons are by calendar day,
//! so the time of `now` never matters.
//!
//! Trailing windows are inclusive of their first day, include today and have
//! no upper bound: an expense dated in the future counts toward every window.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::config::LimitConfig;
use crate::models::{
    BudgetStatus, CategoryTotal, DailyTotal, Expense, LimitAlert, LimitWindow, PaymentModeTotal,
    Summary,
};

/// Days averaged over for `Summary::avg_daily_30`
pub const AVERAGE_WINDOW_DAYS: i64 = 30;

/// Dashboard figures relative to `now`
pub fn summarize(records: &[Expense], now: NaiveDateTime) -> Summary {
    let today = now.date();
    let week_start = today - Duration::days(7);
    let month_start = today - Duration::days(AVERAGE_WINDOW_DAYS);

    let mut summary = Summary::default();
    for e in records {
        summary.total += e.amount;
        if e.date == today {
            summary.today += e.amount;
        }
        if e.date >= week_start {
            summary.last7 += e.amount;
        }
        if e.date >= month_start {
            summary.last30 += e.amount;
        }
    }
    summary.avg_daily_30 = summary.last30 / AVERAGE_WINDOW_DAYS as f64;

    summary
}

/// Totals per category, largest first (ties by name)
pub fn group_by_category(records: &[Expense]) -> Vec<CategoryTotal> {
    let mut totals: HashMap<&str, (f64, usize)> = HashMap::new();
    for e in records {
        let entry = totals.entry(e.category.as_str()).or_default();
        entry.0 += e.amount;
        entry.1 += 1;
    }

    let mut grouped: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, (amount, count))| CategoryTotal {
            category: category.to_string(),
            amount,
            count,
        })
        .collect();
    grouped.sort_by(|a, b| {
        b.amount
            .total_cmp(&a.amount)
            .then_with(|| a.category.cmp(&b.category))
    });
    grouped
}

/// Totals per payment mode, largest first (ties by name)
pub fn group_by_payment_mode(records: &[Expense]) -> Vec<PaymentModeTotal> {
    let mut totals: HashMap<&str, (f64, usize)> = HashMap::new();
    for e in records {
        let entry = totals.entry(e.payment_mode.as_str()).or_default();
        entry.0 += e.amount;
        entry.1 += 1;
    }

    let mut grouped: Vec<PaymentModeTotal> = totals
        .into_iter()
        .map(|(payment_mode, (amount, count))| PaymentModeTotal {
            payment_mode: payment_mode.to_string(),
            amount,
            count,
        })
        .collect();
    grouped.sort_by(|a, b| {
        b.amount
            .total_cmp(&a.amount)
            .then_with(|| a.payment_mode.cmp(&b.payment_mode))
    });
    grouped
}

/// Totals per calendar day, oldest first. Days without spending are omitted.
pub fn group_by_day(records: &[Expense]) -> Vec<DailyTotal> {
    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for e in records {
        *totals.entry(e.date).or_insert(0.0) += e.amount;
    }

    totals
        .into_iter()
        .map(|(date, amount)| DailyTotal { date, amount })
        .collect()
}

fn in_same_month(date: NaiveDate, today: NaiveDate) -> bool {
    date.year() == today.year() && date.month() == today.month()
}

/// Spending in the calendar month containing `now`
pub fn month_to_date(records: &[Expense], now: NaiveDateTime) -> f64 {
    let today = now.date();
    records
        .iter()
        .filter(|e| in_same_month(e.date, today))
        .map(|e| e.amount)
        .sum()
}

/// Month-to-date spending for each budgeted category, most used first
pub fn budget_status(
    records: &[Expense],
    budgets: &BTreeMap<String, f64>,
    now: NaiveDateTime,
) -> Vec<BudgetStatus> {
    let today = now.date();

    let mut statuses: Vec<BudgetStatus> = budgets
        .iter()
        .map(|(category, &limit)| {
            let spent: f64 = records
                .iter()
                .filter(|e| &e.category == category && in_same_month(e.date, today))
                .map(|e| e.amount)
                .sum();
            let percent_used = if limit > 0.0 {
                spent / limit * 100.0
            } else {
                0.0
            };
            BudgetStatus {
                category: category.clone(),
                limit,
                spent,
                remaining: limit - spent,
                percent_used,
                over_budget: spent > limit,
            }
        })
        .collect();

    statuses.sort_by(|a, b| {
        b.percent_used
            .total_cmp(&a.percent_used)
            .then_with(|| a.category.cmp(&b.category))
    });
    statuses
}

/// Limits exceeded by today's, the trailing week's or this month's spending
pub fn limit_alerts(summary: &Summary, month_to_date: f64, limits: &LimitConfig) -> Vec<LimitAlert> {
    [
        (LimitWindow::Daily, limits.daily, summary.today),
        (LimitWindow::Weekly, limits.weekly, summary.last7),
        (LimitWindow::Monthly, limits.monthly, month_to_date),
    ]
    .into_iter()
    .filter_map(|(window, limit, spent)| {
        let limit = limit?;
        (spent > limit).then_some(LimitAlert {
            window,
            limit,
            spent,
        })
    })
    .collect()
}
