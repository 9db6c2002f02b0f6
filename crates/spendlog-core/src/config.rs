//! Application configuration
//!
//! Categories, payment modes, currency, display defaults, budgets, limit
//! alerts, paths and backup settings live in one `Config` value that callers
//! pass around explicitly.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Embedded defaults (compiled into binary)
//! 2. Override file: `--config <path>`, else `~/.config/spendlog/config.toml`
//!    if it exists. Sections present in the override replace the defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{FixedOffset, Local, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{SortField, SortOrder};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// A top-level category and the subcategories offered for it
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategoryConfig {
    pub name: String,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default)]
    pub subcategories: Vec<String>,
}

/// Spending limits that raise alerts on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct LimitConfig {
    pub daily: Option<f64>,
    pub weekly: Option<f64>,
    pub monthly: Option<f64>,
}

/// Automatic backup settings
#[derive(Debug, Clone, PartialEq)]
pub struct BackupConfig {
    pub enabled: bool,
    /// Minimum age of the newest backup before another is taken
    pub interval_days: i64,
    /// Backup directory (platform data dir when unset)
    pub folder: Option<PathBuf>,
    /// Backups kept after pruning
    pub keep: usize,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_days: 7,
            folder: None,
            keep: 10,
        }
    }
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub currency_symbol: String,
    pub currency_name: String,
    pub categories: Vec<CategoryConfig>,
    pub payment_modes: Vec<String>,
    pub date_format: String,
    pub default_sort: SortField,
    pub default_sort_order: SortOrder,
    pub recent_entries: usize,
    /// Monthly budget per category
    pub budgets: BTreeMap<String, f64>,
    pub limits: LimitConfig,
    pub db_path: PathBuf,
    pub export_path: PathBuf,
    pub backup: BackupConfig,
    /// Fixed offset that decides the current calendar day; `None` = system offset
    pub utc_offset: Option<FixedOffset>,
    /// Metric card colours as hex strings
    pub colors: BTreeMap<String, String>,
    /// Override file the config was read from, if any
    pub source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency_symbol: "₹".to_string(),
            currency_name: "INR".to_string(),
            categories: Vec::new(),
            payment_modes: Vec::new(),
            date_format: "%Y-%m-%d".to_string(),
            default_sort: SortField::Date,
            default_sort_order: SortOrder::Desc,
            recent_entries: 50,
            budgets: BTreeMap::new(),
            limits: LimitConfig::default(),
            db_path: PathBuf::from("expenses.db"),
            export_path: PathBuf::from("expenses_export.csv"),
            backup: BackupConfig::default(),
            utc_offset: None,
            colors: BTreeMap::new(),
            source: None,
        }
    }
}

impl Config {
    /// Load the embedded defaults, then apply the override file.
    ///
    /// An explicit `path` must exist. Without one, the default override
    /// location is used only if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::builtin()?;

        let override_path = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        p.display()
                    )));
                }
                Some(p.to_path_buf())
            }
            None => default_config_path().filter(|p| p.exists()),
        };

        if let Some(p) = override_path {
            debug!("Loading config override from {}", p.display());
            let content = fs::read_to_string(&p)
                .map_err(|e| Error::Config(format!("Failed to read {}: {}", p.display(), e)))?;
            config.apply(parse_raw(&content)?)?;
            config.source = Some(p);
        }

        Ok(config)
    }

    /// Embedded defaults only
    pub fn builtin() -> Result<Self> {
        Self::from_toml(DEFAULT_CONFIG)
    }

    /// Parse a full config from TOML content, layered over `Config::default()`
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config = Self::default();
        config.apply(parse_raw(content)?)?;
        Ok(config)
    }

    fn apply(&mut self, raw: RawConfig) -> Result<()> {
        if let Some(currency) = raw.currency {
            if let Some(symbol) = currency.symbol {
                self.currency_symbol = symbol;
            }
            if let Some(name) = currency.name {
                self.currency_name = name;
            }
        }

        if let Some(categories) = raw.categories {
            self.categories = categories;
        }
        if let Some(modes) = raw.payment_modes {
            self.payment_modes = modes;
        }

        if let Some(display) = raw.display {
            if let Some(fmt) = display.date_format {
                self.date_format = fmt;
            }
            if let Some(sort) = display.default_sort {
                self.default_sort = sort.parse().map_err(Error::Config)?;
            }
            if let Some(order) = display.default_sort_order {
                self.default_sort_order = order.parse().map_err(Error::Config)?;
            }
            if let Some(n) = display.recent_entries {
                self.recent_entries = n;
            }
        }

        if let Some(budgets) = raw.budgets {
            self.budgets = budgets;
        }
        if let Some(limits) = raw.limits {
            self.limits = limits;
        }

        if let Some(db) = raw.database {
            if let Some(path) = db.path {
                self.db_path = path;
            }
            if let Some(path) = db.export_path {
                self.export_path = path;
            }
        }

        if let Some(backup) = raw.backup {
            if let Some(enabled) = backup.enabled {
                self.backup.enabled = enabled;
            }
            if let Some(days) = backup.interval_days {
                self.backup.interval_days = days;
            }
            if backup.folder.is_some() {
                self.backup.folder = backup.folder;
            }
            if let Some(keep) = backup.keep {
                self.backup.keep = keep;
            }
        }

        if let Some(tz) = raw.timezone {
            self.utc_offset = match tz.utc_offset.as_deref() {
                Some(s) if !s.eq_ignore_ascii_case("local") => Some(parse_utc_offset(s)?),
                _ => None,
            };
        }

        if let Some(colors) = raw.colors {
            self.colors = colors;
        }

        Ok(())
    }

    /// Current wall-clock time in the configured timezone
    pub fn now(&self) -> NaiveDateTime {
        match self.utc_offset {
            Some(offset) => Utc::now().with_timezone(&offset).naive_local(),
            None => Local::now().naive_local(),
        }
    }

    pub fn category(&self, name: &str) -> Option<&CategoryConfig> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn category_names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    /// Subcategories for a category; unknown categories only offer "Other"
    pub fn subcategories_for(&self, category: &str) -> Vec<&str> {
        match self.category(category) {
            Some(c) if !c.subcategories.is_empty() => {
                c.subcategories.iter().map(String::as_str).collect()
            }
            _ => vec!["Other"],
        }
    }

    pub fn emoji_for(&self, category: &str) -> &str {
        self.category(category)
            .and_then(|c| c.emoji.as_deref())
            .unwrap_or("")
    }

    /// Reject a category, subcategory or payment mode outside the configured choices
    pub fn check_choices(&self, category: &str, subcategory: &str, payment_mode: &str) -> Result<()> {
        if self.category(category).is_none() {
            return Err(Error::Validation(format!(
                "Unknown category '{}'. Choose one of: {}",
                category,
                self.category_names().join(", ")
            )));
        }

        let subs = self.subcategories_for(category);
        if !subs.contains(&subcategory) {
            return Err(Error::Validation(format!(
                "Unknown subcategory '{}' for {}. Choose one of: {}",
                subcategory,
                category,
                subs.join(", ")
            )));
        }

        if !self.payment_modes.iter().any(|m| m == payment_mode) {
            return Err(Error::Validation(format!(
                "Unknown payment mode '{}'. Choose one of: {}",
                payment_mode,
                self.payment_modes.join(", ")
            )));
        }

        Ok(())
    }

    /// Case-insensitive lookup returning the configured spelling
    pub fn resolve_category(&self, name: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
            .map(|c| c.name.as_str())
    }

    pub fn resolve_payment_mode(&self, name: &str) -> Option<&str> {
        self.payment_modes
            .iter()
            .find(|m| m.eq_ignore_ascii_case(name.trim()))
            .map(String::as_str)
    }

    pub fn resolve_subcategory<'a>(&'a self, category: &str, name: &str) -> Option<&'a str> {
        self.subcategories_for(category)
            .into_iter()
            .find(|s| s.eq_ignore_ascii_case(name.trim()))
    }

    /// Format an amount with the currency symbol and thousands separators
    pub fn money(&self, amount: f64) -> String {
        format!("{}{}", self.currency_symbol, group_thousands(amount, 2))
    }

    /// Like `money`, rounded to whole units (dashboard figures)
    pub fn money_whole(&self, amount: f64) -> String {
        format!("{}{}", self.currency_symbol, group_thousands(amount, 0))
    }

    /// RGB for a metric colour key, if configured as `#rrggbb`
    pub fn metric_rgb(&self, key: &str) -> Option<(u8, u8, u8)> {
        let hex = self.colors.get(key)?.strip_prefix('#')?;
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some((channel(0)?, channel(2)?, channel(4)?))
    }

    /// Backup directory, falling back to the platform data directory
    pub fn backup_dir(&self) -> PathBuf {
        self.backup
            .folder
            .clone()
            .unwrap_or_else(crate::backup::default_backup_dir)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("spendlog").join("config.toml"))
}

/// Parse "+05:30", "-0800" or "Z" into a fixed offset
pub fn parse_utc_offset(s: &str) -> Result<FixedOffset> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0)
            .ok_or_else(|| Error::Config("Invalid UTC offset".to_string()));
    }

    let invalid = || Error::Config(format!("Invalid UTC offset: {} (expected +HH:MM)", s));

    let (sign, rest) = match s.chars().next() {
        Some('+') => (1, &s[1..]),
        Some('-') => (-1, &s[1..]),
        _ => return Err(invalid()),
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

fn group_thousands(amount: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, amount.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && formatted.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    currency: Option<RawCurrency>,
    categories: Option<Vec<CategoryConfig>>,
    payment_modes: Option<Vec<String>>,
    display: Option<RawDisplay>,
    budgets: Option<BTreeMap<String, f64>>,
    limits: Option<LimitConfig>,
    database: Option<RawDatabase>,
    backup: Option<RawBackup>,
    timezone: Option<RawTimezone>,
    colors: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct RawCurrency {
    symbol: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDisplay {
    date_format: Option<String>,
    default_sort: Option<String>,
    default_sort_order: Option<String>,
    recent_entries: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawDatabase {
    path: Option<PathBuf>,
    export_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawBackup {
    enabled: Option<bool>,
    interval_days: Option<i64>,
    folder: Option<PathBuf>,
    keep: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawTimezone {
    utc_offset: Option<String>,
}

fn parse_raw(content: &str) -> Result<RawConfig> {
    toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_config() {
        let config = Config::builtin().unwrap();
        assert_eq!(config.currency_symbol, "₹");
        assert_eq!(config.categories.len(), 15);
        assert_eq!(config.categories[0].name, "Travel");
        assert_eq!(config.emoji_for("Rent"), "🏠");
        assert!(config.payment_modes.contains(&"UPI".to_string()));
        assert_eq!(config.budgets.get("Travel"), Some(&5000.0));
        assert_eq!(config.limits.daily, Some(1000.0));
        assert_eq!(config.utc_offset, FixedOffset::east_opt(5 * 3600 + 30 * 60));
        assert!(config.backup.enabled);
        assert_eq!(config.backup.interval_days, 7);
    }

    #[test]
    fn test_override_keeps_unspecified_sections() {
        let mut config = Config::builtin().unwrap();
        let raw = parse_raw(
            r#"
            payment_modes = ["Cash", "Card"]

            [currency]
            symbol = "$"

            [display]
            default_sort = "amount"
            default_sort_order = "asc"
            "#,
        )
        .unwrap();
        config.apply(raw).unwrap();

        assert_eq!(config.currency_symbol, "$");
        assert_eq!(config.currency_name, "INR");
        assert_eq!(config.payment_modes, vec!["Cash", "Card"]);
        assert_eq!(config.default_sort, SortField::Amount);
        assert_eq!(config.default_sort_order, SortOrder::Asc);
        assert_eq!(config.categories.len(), 15);
    }

    #[test]
    fn test_invalid_sort_is_config_error() {
        let err = Config::from_toml("[display]\ndefault_sort = \"size\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let err = Config::load(Some(Path::new("/nonexistent/spendlog.toml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_load_override_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[timezone]\nutc_offset = \"local\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert!(config.utc_offset.is_none());
        assert_eq!(config.source.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_check_choices() {
        let config = Config::builtin().unwrap();
        assert!(config.check_choices("Travel", "Metro", "UPI").is_ok());
        assert!(config.check_choices("Pets", "Food", "UPI").is_err());
        assert!(config.check_choices("Travel", "Zomato", "UPI").is_err());
        assert!(config.check_choices("Travel", "Metro", "Barter").is_err());
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let config = Config::builtin().unwrap();
        assert_eq!(config.resolve_category("food-order"), Some("Food-Order"));
        assert_eq!(config.resolve_subcategory("Food-Order", "swiggy"), Some("Swiggy"));
        assert_eq!(config.resolve_payment_mode("credit card"), Some("Credit Card"));
        assert_eq!(config.resolve_category("nope"), None);
    }

    #[test]
    fn test_unknown_category_offers_other() {
        let config = Config::builtin().unwrap();
        assert_eq!(config.subcategories_for("Pets"), vec!["Other"]);
    }

    #[test]
    fn test_parse_utc_offset() {
        assert_eq!(
            parse_utc_offset("+05:30").unwrap(),
            FixedOffset::east_opt(19800).unwrap()
        );
        assert_eq!(
            parse_utc_offset("-0800").unwrap(),
            FixedOffset::west_opt(8 * 3600).unwrap()
        );
        assert_eq!(parse_utc_offset("Z").unwrap(), FixedOffset::east_opt(0).unwrap());
        assert!(parse_utc_offset("05:30").is_err());
        assert!(parse_utc_offset("+25:00").is_err());
    }

    #[test]
    fn test_money_formatting() {
        let config = Config::builtin().unwrap();
        assert_eq!(config.money(1234567.5), "₹1,234,567.50");
        assert_eq!(config.money(12.0), "₹12.00");
        assert_eq!(config.money_whole(999.6), "₹1,000");
        assert_eq!(config.money(-50.0), "₹-50.00");
        assert_eq!(config.money(0.0), "₹0.00");
    }

    #[test]
    fn test_metric_rgb() {
        let config = Config::builtin().unwrap();
        assert_eq!(config.metric_rgb("primary"), Some((0x66, 0x7e, 0xea)));
        assert_eq!(config.metric_rgb("missing"), None);
    }

    #[test]
    fn test_metric_rgb_rejects_non_hex() {
        let mut config = Config::builtin().unwrap();
        config.colors.insert("primary".to_string(), "#€abc".to_string());
        config.colors.insert("secondary".to_string(), "#12345g".to_string());
        config.colors.insert("tertiary".to_string(), "667eea".to_string());

        assert_eq!(config.metric_rgb("primary"), None);
        assert_eq!(config.metric_rgb("secondary"), None);
        assert_eq!(config.metric_rgb("tertiary"), None);
    }
}
