//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `backup` - Backup management commands (create, list, restore, prune)
//! - `config` - Config and taxonomy display (categories, config path/show)
//! - `core` - Core commands (init) and shared utilities (open_db, auto-backup)
//! - `expenses` - Add, history and delete, plus the owned history query
//! - `export` - Export and CSV re-import
//! - `shell` - Interactive session
//! - `stats` - Dashboard and budget views

pub mod backup;
pub mod config;
pub mod core;
pub mod expenses;
pub mod export;
pub mod shell;
pub mod stats;

// Re-export command functions for main.rs
pub use backup::*;
pub use config::*;
pub use self::core::*;
pub use expenses::*;
pub use export::*;
pub use shell::*;
pub use stats::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Wrap text in a 24-bit ANSI foreground colour, if one is given
pub fn paint(text: &str, rgb: Option<(u8, u8, u8)>) -> String {
    match rgb {
        Some((r, g, b)) => format!("\x1b[38;2;{};{};{}m{}\x1b[0m", r, g, b, text),
        None => text.to_string(),
    }
}

/// Horizontal bar for a share in `0.0..=1.0`
pub fn bar(fraction: f64, width: usize) -> String {
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (fraction * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}
