//! Configuration and taxonomy display commands

use anyhow::Result;
use spendlog_core::config::default_config_path;
use spendlog_core::Config;

pub fn cmd_categories(config: &Config) -> Result<()> {
    println!();
    println!("🏷️  Categories");
    println!("   ─────────────────────────────────────────────────────────────");

    for category in &config.categories {
        let budget = config
            .budgets
            .get(&category.name)
            .map(|b| format!(" (budget {}/month)", config.money_whole(*b)))
            .unwrap_or_default();
        println!(
            "   {} {}{}",
            category.emoji.as_deref().unwrap_or("•"),
            category.name,
            budget
        );
        println!(
            "      {}",
            config.subcategories_for(&category.name).join(", ")
        );
    }

    println!();
    println!("💳 Payment Modes");
    println!("   ─────────────────────────────────────────────────────────────");
    for mode in &config.payment_modes {
        println!("   {}", mode);
    }

    Ok(())
}

pub fn cmd_config_path(config: &Config) -> Result<()> {
    match (&config.source, default_config_path()) {
        (Some(source), _) => println!("{}", source.display()),
        (None, Some(default)) => {
            println!("{}", default.display());
            println!("(not present; using built-in defaults)");
        }
        (None, None) => println!("No config directory on this platform; using built-in defaults"),
    }
    Ok(())
}

pub fn cmd_config_show(config: &Config) -> Result<()> {
    println!();
    println!("⚙️  Configuration");
    println!("   ─────────────────────────────────────────────────────────────");
    match &config.source {
        Some(path) => println!("   Source:          {}", path.display()),
        None => println!("   Source:          built-in defaults"),
    }
    println!(
        "   Currency:        {} ({})",
        config.currency_symbol, config.currency_name
    );
    println!("   Database:        {}", config.db_path.display());
    println!("   Export path:     {}", config.export_path.display());
    println!("   Date format:     {}", config.date_format);
    println!(
        "   History:         {} {}, {} recent entries",
        config.default_sort, config.default_sort_order, config.recent_entries
    );
    match config.utc_offset {
        Some(offset) => println!("   Timezone:        UTC{}", offset),
        None => println!("   Timezone:        system local"),
    }
    println!("   Today:           {}", config.now().date());

    println!();
    println!("   Limits:");
    let limits = [
        ("daily", config.limits.daily),
        ("weekly", config.limits.weekly),
        ("monthly", config.limits.monthly),
    ];
    for (window, limit) in limits {
        match limit {
            Some(amount) => println!("     {:<8} {}", window, config.money(amount)),
            None => println!("     {:<8} none", window),
        }
    }

    println!();
    if config.backup.enabled {
        println!(
            "   Backups:         every {} day(s), keep {}, in {}",
            config.backup.interval_days,
            config.backup.keep,
            config.backup_dir().display()
        );
    } else {
        println!("   Backups:         disabled");
    }
    println!(
        "   Categories:      {} ({} budgeted)",
        config.categories.len(),
        config.budgets.len()
    );
    println!("   Payment modes:   {}", config.payment_modes.len());

    Ok(())
}
