//! Spendlog CLI - Personal expense tracker
//!
//! Usage:
//!   spendlog init                                  Initialize database
//!   spendlog add -a 120 -c Outing -s Cafe -p UPI   Record an expense
//!   spendlog history --category Travel             Browse expenses
//!   spendlog stats                                 Spending dashboard
//!   spendlog shell                                 Interactive session

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use clap::Parser;
use spendlog_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;
use commands::HistoryQuery;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (warn)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let db_path = commands::resolve_db_path(cli.db.as_deref(), &config);

    match cli.command {
        Commands::Init => commands::cmd_init(&db_path, &config),
        Commands::Add(args) => {
            let db = commands::open_db(&db_path)?;
            commands::run_auto_backup(&db, &config);
            if commands::cmd_add(&db, &config, &args)?.is_none() {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::History { filter, all } => {
            let db = commands::open_db(&db_path)?;
            let default_limit = if all { None } else { Some(config.recent_entries) };
            let query = HistoryQuery::from_args(&config, &filter, default_limit);
            commands::cmd_history(&db, &config, &query)?;
            Ok(())
        }
        Commands::Delete { id } => {
            let db = commands::open_db(&db_path)?;
            commands::run_auto_backup(&db, &config);
            commands::cmd_delete(&db, &config, id)?;
            Ok(())
        }
        Commands::Stats { days } => {
            let db = commands::open_db(&db_path)?;
            commands::cmd_stats(&db, &config, days)
        }
        Commands::Budget => {
            let db = commands::open_db(&db_path)?;
            commands::cmd_budget(&db, &config)
        }
        Commands::Export {
            output,
            format,
            filter,
        } => {
            let db = commands::open_db(&db_path)?;
            let query = HistoryQuery::from_args(&config, &filter, None);
            commands::cmd_export(&db, &config, &query, output.as_deref(), format)?;
            Ok(())
        }
        Commands::Import { file, dry_run } => {
            let db = commands::open_db(&db_path)?;
            if !dry_run {
                commands::run_auto_backup(&db, &config);
            }
            commands::cmd_import(&db, &config, &file, dry_run)?;
            Ok(())
        }
        Commands::Categories => commands::cmd_categories(&config),
        Commands::Backup { action } => match action {
            BackupAction::Create { name, dir } => {
                let db = commands::open_db(&db_path)?;
                commands::cmd_backup_create(&db, &config, name.as_deref(), dir)
            }
            BackupAction::List { dir } => commands::cmd_backup_list(&config, dir),
            BackupAction::Restore { name, dir, force } => {
                commands::cmd_backup_restore(&db_path, &config, &name, dir, force)
            }
            BackupAction::Prune { keep, dir, yes } => {
                commands::cmd_backup_prune(&config, keep, dir, yes)
            }
        },
        Commands::Config { action } => match action {
            Some(ConfigAction::Path) => commands::cmd_config_path(&config),
            Some(ConfigAction::Show) | None => commands::cmd_config_show(&config),
        },
        Commands::Shell => {
            let db = commands::open_db(&db_path)?;
            commands::run_auto_backup(&db, &config);
            commands::cmd_shell(&db, &config)
        }
    }
}
