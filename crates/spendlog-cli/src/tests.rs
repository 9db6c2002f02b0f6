//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use chrono::NaiveDate;
use clap::Parser;
use spendlog_core::db::Database;
use spendlog_core::{Config, Error as CoreError, SortField, SortOrder};
use tempfile::TempDir;

use crate::cli::{AddArgs, Cli, Commands, FilterArgs};
use crate::commands::{self, bar, split_words, truncate, Flow, HistoryQuery, Session};

fn setup() -> (Database, Config) {
    (Database::in_memory().unwrap(), Config::builtin().unwrap())
}

fn add_args(amount: f64, category: &str, sub: Option<&str>) -> AddArgs {
    AddArgs {
        amount,
        category: category.to_string(),
        subcategory: sub.map(String::from),
        payment: Some("UPI".to_string()),
        date: Some(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()),
        note: None,
    }
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_add() {
    let cli = Cli::try_parse_from([
        "spendlog", "add", "-a", "120.5", "-c", "outing", "-s", "Cafe", "--note", "coffee",
    ])
    .unwrap();

    match cli.command {
        Commands::Add(args) => {
            assert_eq!(args.amount, 120.5);
            assert_eq!(args.category, "outing");
            assert_eq!(args.subcategory.as_deref(), Some("Cafe"));
            assert_eq!(args.payment, None);
            assert_eq!(args.note.as_deref(), Some("coffee"));
        }
        _ => panic!("expected add"),
    }
}

#[test]
fn test_parse_history_filters() {
    let cli = Cli::try_parse_from([
        "spendlog", "--db", "x.db", "history", "-c", "Travel", "-c", "Rent", "--from",
        "2024-01-01", "--sort", "amount", "--order", "asc",
    ])
    .unwrap();

    assert_eq!(cli.db.as_deref(), Some(std::path::Path::new("x.db")));
    match cli.command {
        Commands::History { filter, all } => {
            assert!(!all);
            assert_eq!(filter.categories, vec!["Travel", "Rent"]);
            assert_eq!(filter.from, NaiveDate::from_ymd_opt(2024, 1, 1));
            assert_eq!(filter.sort, Some(SortField::Amount));
            assert_eq!(filter.order, Some(SortOrder::Asc));
        }
        _ => panic!("expected history"),
    }
}

#[test]
fn test_parse_rejects_bad_date() {
    assert!(Cli::try_parse_from(["spendlog", "history", "--from", "01/02/2024"]).is_err());
}

// ========== Add Command Tests ==========

#[test]
fn test_build_new_expense_resolves_names() {
    let (_, config) = setup();
    let mut args = add_args(99.0, "food-order", Some("swiggy"));
    args.payment = Some("credit card".to_string());

    let expense = commands::build_new_expense(&config, &args).unwrap();
    assert_eq!(expense.category, "Food-Order");
    assert_eq!(expense.subcategory, "Swiggy");
    assert_eq!(expense.payment_mode, "Credit Card");
}

#[test]
fn test_build_new_expense_defaults() {
    let (_, config) = setup();
    let mut args = add_args(10.0, "Travel", None);
    args.payment = None;
    args.date = None;

    let expense = commands::build_new_expense(&config, &args).unwrap();
    assert_eq!(expense.subcategory, "Other");
    assert_eq!(expense.payment_mode, config.payment_modes[0]);
    assert_eq!(expense.date, config.now().date());
}

#[test]
fn test_build_new_expense_requires_subcategory_without_other() {
    let (_, config) = setup();
    let err = commands::build_new_expense(&config, &add_args(10.0, "Rent", None)).unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
}

#[test]
fn test_build_new_expense_rejects_unknown_choices() {
    let (_, config) = setup();

    let err = commands::build_new_expense(&config, &add_args(10.0, "Yachts", None)).unwrap_err();
    assert!(err.to_string().contains("Unknown category"));

    let err = commands::build_new_expense(&config, &add_args(10.0, "Travel", Some("Rocket")))
        .unwrap_err();
    assert!(err.to_string().contains("Unknown subcategory"));

    let mut args = add_args(10.0, "Travel", Some("Metro"));
    args.payment = Some("Barter".to_string());
    let err = commands::build_new_expense(&config, &args).unwrap_err();
    assert!(err.to_string().contains("Unknown payment mode"));
}

#[test]
fn test_cmd_add_records_expense() {
    let (db, config) = setup();
    let id = commands::cmd_add(&db, &config, &add_args(120.0, "Outing", Some("Cafe")))
        .unwrap()
        .unwrap();

    let stored = db.get_expense(id).unwrap().unwrap();
    assert_eq!(stored.amount, 120.0);
    assert_eq!(stored.subcategory, "Cafe");
}

#[test]
fn test_cmd_add_invalid_amount_changes_nothing() {
    let (db, config) = setup();

    for amount in [0.0, -5.0, f64::NAN] {
        let result = commands::cmd_add(&db, &config, &add_args(amount, "Outing", Some("Cafe")));
        assert_eq!(result.unwrap(), None);
    }
    assert_eq!(db.count_expenses().unwrap(), 0);
}

// ========== History / Delete Tests ==========

#[test]
fn test_history_query_from_args() {
    let (_, config) = setup();
    let args = FilterArgs {
        categories: vec!["travel".to_string(), "Legacy".to_string()],
        sort: Some(SortField::Amount),
        ..FilterArgs::default()
    };

    let query = HistoryQuery::from_args(&config, &args, Some(5));
    assert_eq!(query.categories, vec!["Travel", "Legacy"]);
    assert_eq!(query.sort_field, SortField::Amount);
    assert_eq!(query.sort_order, config.default_sort_order);
    assert_eq!(query.limit, Some(5));
}

#[test]
fn test_cmd_history() {
    let (db, config) = setup();
    let query = HistoryQuery::new(&config);
    assert!(commands::cmd_history(&db, &config, &query).is_ok());

    commands::cmd_add(&db, &config, &add_args(50.0, "Travel", Some("Metro"))).unwrap();
    assert!(commands::cmd_history(&db, &config, &query).is_ok());
}

#[test]
fn test_cmd_history_totals_whole_selection() {
    let (db, config) = setup();
    for _ in 0..55 {
        commands::cmd_add(&db, &config, &add_args(10.0, "Travel", Some("Metro"))).unwrap();
    }

    let query = HistoryQuery {
        limit: Some(50),
        ..HistoryQuery::new(&config)
    };
    assert_eq!(db.search_expenses(&query.filter()).unwrap().len(), 50);

    let (count, total) = commands::cmd_history(&db, &config, &query).unwrap();
    assert_eq!(count, 55);
    assert!((total - 550.0).abs() < 1e-9);
}

#[test]
fn test_cmd_delete() {
    let (db, config) = setup();
    let id = commands::cmd_add(&db, &config, &add_args(50.0, "Travel", Some("Metro")))
        .unwrap()
        .unwrap();

    assert!(commands::cmd_delete(&db, &config, id).unwrap());
    assert!(!commands::cmd_delete(&db, &config, id).unwrap());
    assert_eq!(db.count_expenses().unwrap(), 0);
}

// ========== Stats Tests ==========

#[test]
fn test_cmd_stats_and_budget() {
    let (db, config) = setup();
    assert!(commands::cmd_stats(&db, &config, 14).is_ok());

    let mut args = add_args(6000.0, "Travel", Some("Flight"));
    args.date = None;
    commands::cmd_add(&db, &config, &args).unwrap();
    commands::cmd_add(&db, &config, &add_args(50.0, "Outing", Some("Cafe"))).unwrap();

    assert!(commands::cmd_stats(&db, &config, 14).is_ok());
    assert!(commands::cmd_stats(&db, &config, 0).is_ok());
    assert!(commands::cmd_budget(&db, &config).is_ok());
}

#[test]
fn test_cmd_stats_huge_trend_window() {
    let (db, config) = setup();
    commands::cmd_add(&db, &config, &add_args(50.0, "Outing", Some("Cafe"))).unwrap();

    assert!(commands::cmd_stats(&db, &config, i64::MAX).is_ok());
    assert!(commands::cmd_stats(&db, &config, -5).is_ok());
}

#[test]
fn test_parse_stats_days_is_bounded() {
    let cli = Cli::try_parse_from(["spendlog", "stats", "--days", "3650"]).unwrap();
    assert!(matches!(cli.command, Commands::Stats { days: 3650 }));

    assert!(Cli::try_parse_from(["spendlog", "stats", "--days", "100000000"]).is_err());
    assert!(Cli::try_parse_from(["spendlog", "stats", "--days", "-1"]).is_err());
}

// ========== Export / Import Tests ==========

#[test]
fn test_cmd_export_and_import() {
    let (db, config) = setup();
    let dir = TempDir::new().unwrap();
    commands::cmd_add(&db, &config, &add_args(50.0, "Travel", Some("Metro"))).unwrap();
    commands::cmd_add(&db, &config, &add_args(75.5, "Bills", Some("Phone"))).unwrap();

    let path = dir.path().join("out.csv");
    let query = HistoryQuery {
        limit: None,
        ..HistoryQuery::new(&config)
    };
    let written = commands::cmd_export(&db, &config, &query, Some(&path), None).unwrap();
    assert_eq!(written, 2);

    let target = Database::open(dir.path().join("target.db")).unwrap();
    assert_eq!(commands::cmd_import(&target, &config, &path, true).unwrap(), 0);
    assert_eq!(target.count_expenses().unwrap(), 0);

    assert_eq!(commands::cmd_import(&target, &config, &path, false).unwrap(), 2);
    assert_eq!(target.count_expenses().unwrap(), 2);
}

#[test]
fn test_cmd_export_empty() {
    let (db, config) = setup();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.csv");

    let written =
        commands::cmd_export(&db, &config, &HistoryQuery::new(&config), Some(&path), None).unwrap();
    assert_eq!(written, 0);
    assert!(!path.exists());
}

// ========== Backup Tests ==========

#[test]
fn test_cmd_backup_create_and_list() {
    let (db, config) = setup();
    let dir = TempDir::new().unwrap();
    commands::cmd_add(&db, &config, &add_args(50.0, "Travel", Some("Metro"))).unwrap();

    let backups = dir.path().join("backups");
    commands::cmd_backup_create(&db, &config, None, Some(backups.clone())).unwrap();
    commands::cmd_backup_list(&config, Some(backups.clone())).unwrap();
    commands::cmd_backup_prune(&config, Some(5), Some(backups.clone()), true).unwrap();

    assert_eq!(std::fs::read_dir(&backups).unwrap().count(), 1);
}

#[test]
fn test_run_auto_backup_disabled() {
    let (db, mut config) = setup();
    config.backup.enabled = false;
    assert!(commands::run_auto_backup(&db, &config).is_none());
}

#[test]
fn test_run_auto_backup_creates_once() {
    let (db, mut config) = setup();
    let dir = TempDir::new().unwrap();
    config.backup.folder = Some(dir.path().join("auto"));
    commands::cmd_add(&db, &config, &add_args(50.0, "Travel", Some("Metro"))).unwrap();

    assert!(matches!(
        commands::run_auto_backup(&db, &config),
        Some(spendlog_core::AutoBackupOutcome::Created(_))
    ));
    assert!(matches!(
        commands::run_auto_backup(&db, &config),
        Some(spendlog_core::AutoBackupOutcome::NotDue { .. })
    ));
}

// ========== Session Tests ==========

#[test]
fn test_split_words() {
    assert_eq!(
        split_words(r#"add -a 10 -c "Personal Care" -n "hair cut""#).unwrap(),
        vec!["add", "-a", "10", "-c", "Personal Care", "-n", "hair cut"]
    );
    assert_eq!(split_words("   ").unwrap(), Vec::<String>::new());
    assert_eq!(split_words(r#"add -n """#).unwrap(), vec!["add", "-n", ""]);
    assert!(split_words(r#"add -n "open"#).is_err());
}

#[test]
fn test_session_delete_requires_delete_mode() {
    let (db, config) = setup();
    let id = commands::cmd_add(&db, &config, &add_args(50.0, "Travel", Some("Metro")))
        .unwrap()
        .unwrap();
    let mut session = Session::new(&config);

    let flow = session
        .handle_line(&db, &config, &format!("delete {}", id))
        .unwrap();
    assert_eq!(flow, Flow::Continue);
    assert_eq!(db.count_expenses().unwrap(), 1);

    session.handle_line(&db, &config, "delete-mode on").unwrap();
    assert!(session.delete_mode);
    session
        .handle_line(&db, &config, &format!("delete {}", id))
        .unwrap();
    assert_eq!(db.count_expenses().unwrap(), 0);
    assert!(!session.delete_mode);

    session.handle_line(&db, &config, "delete-mode").unwrap();
    assert!(session.delete_mode);
    session.handle_line(&db, &config, "delete 9999").unwrap();
    assert!(session.delete_mode);
}

#[test]
fn test_session_filter_commands() {
    let (db, config) = setup();
    let mut session = Session::new(&config);

    session
        .handle_line(&db, &config, "filter category travel \"Personal Care\"")
        .unwrap();
    assert_eq!(session.query.categories, vec!["Travel", "Personal Care"]);

    session.handle_line(&db, &config, "filter from 2024-01-01").unwrap();
    session.handle_line(&db, &config, "filter sort amount asc").unwrap();
    session.handle_line(&db, &config, "filter limit").unwrap();
    assert_eq!(session.query.from, NaiveDate::from_ymd_opt(2024, 1, 1));
    assert_eq!(session.query.sort_field, SortField::Amount);
    assert_eq!(session.query.sort_order, SortOrder::Asc);
    assert_eq!(session.query.limit, None);

    session.handle_line(&db, &config, "filter clear").unwrap();
    assert_eq!(session, Session::new(&config));
}

#[test]
fn test_session_add_list_and_quit() {
    let (db, config) = setup();
    let mut session = Session::new(&config);

    session
        .handle_line(&db, &config, "add -a 42 -c outing -s cafe -n \"late coffee\"")
        .unwrap();
    let expenses = db.list_expenses().unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].note.as_deref(), Some("late coffee"));

    assert_eq!(session.handle_line(&db, &config, "list").unwrap(), Flow::Continue);
    assert_eq!(session.handle_line(&db, &config, "").unwrap(), Flow::Continue);
    assert_eq!(
        session.handle_line(&db, &config, "no-such-command").unwrap(),
        Flow::Continue
    );
    assert_eq!(session.handle_line(&db, &config, "quit").unwrap(), Flow::Quit);
}

// ========== Helper Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a long string that exceeds", 10), "a long ...");
    assert_eq!(truncate("exact", 5), "exact");
    assert_eq!(truncate("₹₹₹₹₹₹₹", 6), "₹₹₹...");
}

#[test]
fn test_bar() {
    assert_eq!(bar(0.5, 4), "██░░");
    assert_eq!(bar(1.5, 2), "██");
    assert_eq!(bar(f64::NAN, 2), "░░");
}
