//! Dashboard and budget commands

use anyhow::Result;
use chrono::Duration;
use spendlog_core::{stats, Config, Database};

use super::{bar, paint, truncate};

const BAR_WIDTH: usize = 24;

/// Longest daily trend the dashboard will draw (about ten years)
pub const MAX_TREND_DAYS: i64 = 3650;

pub fn cmd_stats(db: &Database, config: &Config, trend_days: i64) -> Result<()> {
    let trend_days = trend_days.clamp(0, MAX_TREND_DAYS);
    let records = db.list_expenses()?;

    if records.is_empty() {
        println!("No expenses recorded yet. Add one with:");
        println!("  spendlog add --amount 120 --category Outing --subcategory Cafe");
        return Ok(());
    }

    let now = config.now();
    let summary = stats::summarize(&records, now);

    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│         💰 Spending Dashboard           │");
    println!("╰─────────────────────────────────────────╯");
    println!();

    let metrics = [
        ("Today", summary.today, "primary"),
        ("Last 7 days", summary.last7, "secondary"),
        ("Last 30 days", summary.last30, "tertiary"),
        ("Daily avg (30d)", summary.avg_daily_30, "quaternary"),
    ];
    for (label, amount, color) in metrics {
        println!(
            "  {:<16} {}",
            label,
            paint(&config.money_whole(amount), config.metric_rgb(color))
        );
    }
    println!();
    println!(
        "  All time:        {} across {} entries",
        config.money(summary.total),
        records.len()
    );

    // Category breakdown
    let by_category = stats::group_by_category(&records);
    println!();
    println!("  📊 By Category");
    println!("     ─────────────────────────────────────────────────────────");
    for c in &by_category {
        let share = c.amount / summary.total;
        println!(
            "     {:<20} {:>12} {:>5.1}% {}",
            truncate(&format!("{} {}", config.emoji_for(&c.category), c.category), 20),
            config.money(c.amount),
            share * 100.0,
            bar(share, BAR_WIDTH)
        );
    }

    // Payment mode split
    let by_payment = stats::group_by_payment_mode(&records);
    println!();
    println!("  💳 By Payment Mode");
    println!("     ─────────────────────────────────────────────────────────");
    for p in &by_payment {
        println!(
            "     {:<20} {:>12} {:>4} entries",
            truncate(&p.payment_mode, 20),
            config.money(p.amount),
            p.count
        );
    }

    // Daily trend
    if trend_days > 0 {
        let start = now.date() - Duration::days(trend_days - 1);
        let trend: Vec<_> = stats::group_by_day(&records)
            .into_iter()
            .filter(|d| d.date >= start)
            .collect();

        if !trend.is_empty() {
            let peak = trend.iter().map(|d| d.amount).fold(0.0_f64, f64::max);
            println!();
            println!("  📈 Daily Trend (last {} days)", trend_days);
            println!("     ─────────────────────────────────────────────────────────");
            for d in &trend {
                println!(
                    "     {} {:>12} {}",
                    d.date.format(&config.date_format),
                    config.money(d.amount),
                    bar(d.amount / peak, BAR_WIDTH)
                );
            }
        }
    }

    // Limit alerts
    let month_to_date = stats::month_to_date(&records, now);
    let alerts = stats::limit_alerts(&summary, month_to_date, &config.limits);
    println!();
    if alerts.is_empty() {
        println!("  ✅ Within all spending limits");
    } else {
        for alert in &alerts {
            println!(
                "  ⚠️  {} limit exceeded: spent {} of {}",
                capitalize(alert.window.as_str()),
                config.money(alert.spent),
                config.money(alert.limit)
            );
        }
    }

    Ok(())
}

pub fn cmd_budget(db: &Database, config: &Config) -> Result<()> {
    if config.budgets.is_empty() {
        println!("No budgets configured. Add a [budgets] table to your config:");
        println!("  spendlog config path");
        return Ok(());
    }

    let records = db.list_expenses()?;
    let now = config.now();
    let statuses = stats::budget_status(&records, &config.budgets, now);

    println!();
    println!("🎯 Budgets for {}", now.format("%B %Y"));
    println!("   ─────────────────────────────────────────────────────────────────────");

    for s in &statuses {
        let marker = if s.over_budget { "🔴" } else { "🟢" };
        let remaining = if s.over_budget {
            format!("{} over", config.money(-s.remaining))
        } else {
            format!("{} left", config.money(s.remaining))
        };
        println!(
            "   {} {:<18} {:>12} / {:<12} {:>5.0}% {} {}",
            marker,
            truncate(&format!("{} {}", config.emoji_for(&s.category), s.category), 18),
            config.money(s.spent),
            config.money(s.limit),
            s.percent_used,
            bar(s.percent_used / 100.0, 16),
            remaining
        );
    }

    let over = statuses.iter().filter(|s| s.over_budget).count();
    if over > 0 {
        println!();
        println!("⚠️  {} categor{} over budget", over, if over == 1 { "y" } else { "ies" });
    }

    Ok(())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
