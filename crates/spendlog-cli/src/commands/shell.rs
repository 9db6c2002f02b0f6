//! Interactive session
//!
//! Each input line is parsed with clap, so `add` takes the same flags as the
//! top-level command. The session owns the history filter and the
//! delete-mode toggle; nothing is kept in globals.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use spendlog_core::{Config, Database, ExportFormat, SortField, SortOrder};

use super::{
    cmd_add, cmd_budget, cmd_delete, cmd_export, cmd_history, cmd_stats, HistoryQuery,
    MAX_TREND_DAYS,
};
use crate::cli::AddArgs;

#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
#[command(override_usage = "<COMMAND> [ARGS]")]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug)]
enum ShellCommand {
    /// Record an expense
    Add(AddArgs),

    /// Show history with the active filter
    #[command(alias = "ls", alias = "history")]
    List,

    /// Change the history filter
    Filter {
        #[command(subcommand)]
        action: Option<FilterAction>,
    },

    /// Turn delete mode on or off (no argument toggles)
    DeleteMode { state: Option<String> },

    /// Delete an expense (delete mode only)
    #[command(alias = "rm")]
    Delete { id: i64 },

    /// Show the dashboard
    Stats {
        #[arg(long, default_value = "14", value_parser = clap::value_parser!(i64).range(0..=MAX_TREND_DAYS))]
        days: i64,
    },

    /// Show budgets
    Budget,

    /// Export the filtered history
    Export {
        output: Option<PathBuf>,
        #[arg(short, long)]
        format: Option<ExportFormat>,
    },

    /// Leave the session
    #[command(alias = "exit", alias = "q")]
    Quit,
}

#[derive(Subcommand, Debug)]
enum FilterAction {
    /// Only these categories (none clears)
    Category { names: Vec<String> },
    /// First day to include (none clears)
    From { date: Option<NaiveDate> },
    /// Last day to include (none clears)
    To { date: Option<NaiveDate> },
    /// Sort field and optional order
    Sort {
        field: SortField,
        order: Option<SortOrder>,
    },
    /// Maximum entries shown (none shows all)
    Limit { count: Option<usize> },
    /// Back to the configured defaults
    Clear,
}

/// Whether the session should keep reading input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Per-session state
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub query: HistoryQuery,
    pub delete_mode: bool,
}

impl Session {
    pub fn new(config: &Config) -> Self {
        Self {
            query: HistoryQuery::new(config),
            delete_mode: false,
        }
    }

    /// Run one input line. Usage errors are printed, not returned.
    pub fn handle_line(&mut self, db: &Database, config: &Config, line: &str) -> Result<Flow> {
        let words = match split_words(line) {
            Ok(words) => words,
            Err(msg) => {
                println!("❌ {}", msg);
                return Ok(Flow::Continue);
            }
        };
        if words.is_empty() {
            return Ok(Flow::Continue);
        }

        let parsed = match ShellLine::try_parse_from(&words) {
            Ok(parsed) => parsed,
            Err(e) => {
                // Covers `help` as well as real mistakes
                print!("{}", e);
                return Ok(Flow::Continue);
            }
        };

        match parsed.command {
            ShellCommand::Add(args) => {
                cmd_add(db, config, &args)?;
            }
            ShellCommand::List => {
                if self.query.filter().is_filtered() {
                    println!("Filter: {}", self.query.describe());
                }
                cmd_history(db, config, &self.query)?;
            }
            ShellCommand::Filter { action } => {
                if let Some(action) = action {
                    self.apply_filter(config, action);
                }
                println!("Filter: {}", self.query.describe());
            }
            ShellCommand::DeleteMode { state } => {
                let enabled = match state.as_deref().map(str::to_lowercase).as_deref() {
                    None => !self.delete_mode,
                    Some("on") | Some("true") | Some("yes") => true,
                    Some("off") | Some("false") | Some("no") => false,
                    Some(other) => {
                        println!("❌ Expected on or off, got '{}'", other);
                        return Ok(Flow::Continue);
                    }
                };
                self.delete_mode = enabled;
                if enabled {
                    println!("🗑️  Delete mode ON: `delete <id>` removes entries");
                } else {
                    println!("Delete mode off");
                }
            }
            ShellCommand::Delete { id } => {
                if self.delete_mode {
                    if cmd_delete(db, config, id)? {
                        self.delete_mode = false;
                        println!("Delete mode off");
                    }
                } else {
                    println!("Delete mode is off. Turn it on with: delete-mode on");
                }
            }
            ShellCommand::Stats { days } => cmd_stats(db, config, days)?,
            ShellCommand::Budget => cmd_budget(db, config)?,
            ShellCommand::Export { output, format } => {
                let query = HistoryQuery {
                    limit: None,
                    ..self.query.clone()
                };
                cmd_export(db, config, &query, output.as_deref(), format)?;
            }
            ShellCommand::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    fn apply_filter(&mut self, config: &Config, action: FilterAction) {
        match action {
            FilterAction::Category { names } => {
                self.query.categories = names
                    .iter()
                    .map(|n| {
                        config
                            .resolve_category(n)
                            .map(String::from)
                            .unwrap_or_else(|| n.clone())
                    })
                    .collect();
            }
            FilterAction::From { date } => self.query.from = date,
            FilterAction::To { date } => self.query.to = date,
            FilterAction::Sort { field, order } => {
                self.query.sort_field = field;
                if let Some(order) = order {
                    self.query.sort_order = order;
                }
            }
            FilterAction::Limit { count } => self.query.limit = count,
            FilterAction::Clear => self.query = HistoryQuery::new(config),
        }
    }
}

/// Split a line into words, honouring double quotes (`-n "late dinner"`)
pub fn split_words(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_word = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                has_word = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_word {
                    words.push(std::mem::take(&mut current));
                    has_word = false;
                }
            }
            c => {
                current.push(c);
                has_word = true;
            }
        }
    }

    if in_quotes {
        return Err("Unterminated quote".to_string());
    }
    if has_word {
        words.push(current);
    }
    Ok(words)
}

/// Read-eval loop on stdin until `quit` or end of input
pub fn cmd_shell(db: &Database, config: &Config) -> Result<()> {
    let mut session = Session::new(config);

    println!("💰 spendlog interactive session");
    println!("   Type `help` for commands, `quit` to leave.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let marker = if session.delete_mode { " [delete]" } else { "" };
        print!("spendlog{}> ", marker);
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };

        match session.handle_line(db, config, &line) {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            Err(e) => println!("❌ {:#}", e),
        }
    }

    println!();
    Ok(())
}
