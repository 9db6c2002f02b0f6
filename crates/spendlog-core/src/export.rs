//! Flat file export and re-import
//!
//! Supports:
//! - CSV export (header + one row per expense) of any expense slice
//! - JSON export of the same rows
//! - CSV import of files written by `export_to_csv`
//!
//! Export overwrites the destination. A failure part-way leaves the file in
//! whatever state it reached.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::models::{Expense, NewExpense};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// Guess the format from a file extension, defaulting to CSV
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Csv,
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown export format: {} (valid: csv, json)", s)),
        }
    }
}

/// One exported expense, in display order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow<'a> {
    pub date: NaiveDate,
    pub category: &'a str,
    pub subcategory: &'a str,
    pub payment_mode: &'a str,
    pub amount: f64,
    pub note: Option<&'a str>,
}

impl<'a> From<&'a Expense> for ExportRow<'a> {
    fn from(e: &'a Expense) -> Self {
        Self {
            date: e.date,
            category: &e.category,
            subcategory: &e.subcategory,
            payment_mode: &e.payment_mode,
            amount: e.amount,
            note: e.note.as_deref(),
        }
    }
}

/// CSV record as read back. Also accepts the older `expense_date`/`notes`
/// column names; extra columns such as `id` are ignored.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(alias = "expense_date")]
    date: String,
    category: String,
    subcategory: String,
    payment_mode: String,
    amount: String,
    #[serde(alias = "notes", default)]
    note: Option<String>,
}

const CSV_HEADER: [&str; 6] = [
    "date",
    "category",
    "subcategory",
    "payment_mode",
    "amount",
    "note",
];

/// Write expenses to a CSV file, amounts with two decimals
pub fn export_to_csv(records: &[Expense], path: &Path) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(CSV_HEADER)?;

    for e in records {
        writer.write_record([
            e.date.to_string().as_str(),
            e.category.as_str(),
            e.subcategory.as_str(),
            e.payment_mode.as_str(),
            format!("{:.2}", e.amount).as_str(),
            e.note.as_deref().unwrap_or(""),
        ])?;
    }
    writer.flush()?;

    info!("Exported {} expenses to {}", records.len(), path.display());
    Ok(records.len())
}

/// Write expenses to a pretty-printed JSON array
pub fn export_to_json(records: &[Expense], path: &Path) -> Result<usize> {
    let rows: Vec<ExportRow> = records.iter().map(ExportRow::from).collect();
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, &rows)?;

    info!("Exported {} expenses to {}", records.len(), path.display());
    Ok(records.len())
}

/// Export in the requested format, returning the number of rows written
pub fn export(records: &[Expense], path: &Path, format: ExportFormat) -> Result<usize> {
    match format {
        ExportFormat::Csv => export_to_csv(records, path),
        ExportFormat::Json => export_to_json(records, path),
    }
}

/// Read expenses back from a CSV export.
///
/// Every row is checked; the first bad row aborts the read with its line number.
pub fn read_csv(path: &Path) -> Result<Vec<NewExpense>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut expenses = Vec::new();

    for (i, record) in reader.deserialize::<CsvRecord>().enumerate() {
        // Line 1 is the header
        let line = i + 2;
        let record = record?;

        let date = parse_export_date(&record.date).ok_or_else(|| {
            Error::InvalidData(format!("Line {}: invalid date '{}'", line, record.date))
        })?;
        let amount: f64 = record.amount.trim().parse().map_err(|_| {
            Error::InvalidData(format!("Line {}: invalid amount '{}'", line, record.amount))
        })?;

        let expense = NewExpense {
            date,
            category: record.category,
            subcategory: record.subcategory,
            payment_mode: record.payment_mode,
            amount,
            note: record.note.filter(|n| !n.trim().is_empty()),
        };
        expense
            .validate()
            .map_err(|e| Error::Validation(format!("Line {}: {}", line, e)))?;

        expenses.push(expense);
    }

    Ok(expenses)
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time (older exports)
fn parse_export_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let day = s.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::fs;
    use tempfile::TempDir;

    fn expense(id: i64, date: &str, category: &str, amount: f64, note: Option<&str>) -> Expense {
        Expense {
            id,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            category: category.to_string(),
            subcategory: "Other".to_string(),
            payment_mode: "Cash".to_string(),
            amount,
            note: note.map(String::from),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_export_format_parsing() {
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("xml".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::from_path(Path::new("out.json")), ExportFormat::Json);
        assert_eq!(ExportFormat::from_path(Path::new("out.txt")), ExportFormat::Csv);
    }

    #[test]
    fn test_export_csv_layout() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let records = vec![
            expense(2, "2024-01-10", "Travel", 50.0, Some("metro, late")),
            expense(1, "2024-01-01", "Rent", 100.5, None),
        ];

        assert_eq!(export_to_csv(&records, &path).unwrap(), 2);

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "date,category,subcategory,payment_mode,amount,note");
        assert_eq!(lines[1], "2024-01-10,Travel,Other,Cash,50.00,\"metro, late\"");
        assert_eq!(lines[2], "2024-01-01,Rent,Other,Cash,100.50,");
    }

    #[test]
    fn test_export_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "stale content that is longer than the new export\n".repeat(20)).unwrap();

        export_to_csv(&[], &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "date,category,subcategory,payment_mode,amount,note\n");
    }

    #[test]
    fn test_csv_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let records = vec![
            expense(3, "2024-01-10", "Travel", 50.0, Some("with \"quotes\"")),
            expense(2, "2024-01-05", "Food-Order", 199.99, None),
            expense(1, "2024-01-01", "Rent", 100.0, Some("line\nbreak")),
        ];

        export_to_csv(&records, &path).unwrap();
        let read = read_csv(&path).unwrap();

        let expected: Vec<NewExpense> = records.iter().map(NewExpense::from).collect();
        assert_eq!(read, expected);
    }

    #[test]
    fn test_read_csv_accepts_older_column_names() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("legacy.csv");
        fs::write(
            &path,
            "id,expense_date,category,subcategory,payment_mode,amount,notes\n\
             7,2024-01-05 00:00:00,Outing,Cafe,UPI,120.0,\n",
        )
        .unwrap();

        let read = read_csv(&path).unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(read[0].subcategory, "Cafe");
        assert_eq!(read[0].note, None);
    }

    #[test]
    fn test_read_csv_rejects_non_positive_amount() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(
            &path,
            "date,category,subcategory,payment_mode,amount,note\n\
             2024-01-05,Outing,Cafe,UPI,10.00,\n\
             2024-01-06,Outing,Cafe,UPI,0,\n",
        )
        .unwrap();

        let err = read_csv(&path).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("Line 3"));
    }

    #[test]
    fn test_read_csv_rejects_bad_date() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(
            &path,
            "date,category,subcategory,payment_mode,amount,note\n01/05/2024,Outing,Cafe,UPI,10,\n",
        )
        .unwrap();

        let err = read_csv(&path).unwrap_err();
        assert!(err.to_string().contains("invalid date"));
    }

    #[test]
    fn test_export_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        let records = vec![expense(1, "2024-01-01", "Rent", 100.0, None)];

        export(&records, &path, ExportFormat::Json).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value[0]["date"], "2024-01-01");
        assert_eq!(value[0]["category"], "Rent");
        assert_eq!(value[0]["amount"], 100.0);
        assert!(value[0]["note"].is_null());
    }
}
