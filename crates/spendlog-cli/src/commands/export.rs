//! Export and import commands

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use spendlog_core::{export, read_csv, Config, Database, ExportFormat};

use super::HistoryQuery;

/// Export the expenses matching `query`; returns the number of rows written
pub fn cmd_export(
    db: &Database,
    config: &Config,
    query: &HistoryQuery,
    output: Option<&Path>,
    format: Option<ExportFormat>,
) -> Result<usize> {
    let (path, format) = export_target(config, output, format);

    let records = db.search_expenses(&query.filter())?;
    if records.is_empty() {
        println!("Nothing to export.");
        return Ok(0);
    }

    let count = export(&records, &path, format)
        .with_context(|| format!("Failed to export to {}", path.display()))?;

    let total: f64 = records.iter().map(|e| e.amount).sum();
    println!(
        "✅ Exported {} expenses ({}) to {}",
        count,
        config.money(total),
        path.display()
    );
    println!("   Format: {}", format.as_str());

    Ok(count)
}

/// Resolve the output path and format. An explicit format wins; otherwise
/// the file extension decides. The default path follows the format.
fn export_target(
    config: &Config,
    output: Option<&Path>,
    format: Option<ExportFormat>,
) -> (PathBuf, ExportFormat) {
    match output {
        Some(path) => {
            let format = format.unwrap_or_else(|| ExportFormat::from_path(path));
            (path.to_path_buf(), format)
        }
        None => {
            let format = format.unwrap_or_else(|| ExportFormat::from_path(&config.export_path));
            (
                config.export_path.with_extension(format.as_str()),
                format,
            )
        }
    }
}

/// Import a CSV export. The whole file is validated before anything is written.
pub fn cmd_import(db: &Database, config: &Config, file: &Path, dry_run: bool) -> Result<usize> {
    println!("📥 Reading {}...", file.display());

    let expenses =
        read_csv(file).with_context(|| format!("Failed to read {}", file.display()))?;

    if expenses.is_empty() {
        println!("No expenses found in file.");
        return Ok(0);
    }

    let unknown = expenses
        .iter()
        .filter(|e| {
            config
                .check_choices(&e.category, &e.subcategory, &e.payment_mode)
                .is_err()
        })
        .count();
    if unknown > 0 {
        println!(
            "   ⚠️  {} row(s) use categories or payment modes not in your config",
            unknown
        );
    }

    let total: f64 = expenses.iter().map(|e| e.amount).sum();

    if dry_run {
        println!(
            "   Dry run: {} expenses ({}) would be imported",
            expenses.len(),
            config.money(total)
        );
        return Ok(0);
    }

    db.insert_expenses(&expenses)
        .context("Failed to insert imported expenses; nothing was imported")?;

    println!(
        "✅ Imported {} expenses ({})",
        expenses.len(),
        config.money(total)
    );

    Ok(expenses.len())
}
