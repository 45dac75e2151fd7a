//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use finsight_core::{Candidate, PipelineConfig, TransactionType};
use tempfile::TempDir;

use crate::commands::{self, input, truncate, Context};

const TRANSACTIONS_CSV: &str = "\
id,name,amount,type,category,account_id,date
1,Starbucks,5.50,expense,Coffee,chk,2024-01-15
2,Starbucks,5.50,expense,Coffee,chk,2024-01-15
3,Whole Foods,82.10,expense,,chk,2024-01-16
4,Acme Payroll,2500.00,income,Salary,chk,01/31/2024
";

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn test_context(dir: &TempDir) -> Context {
    Context {
        config: PipelineConfig::default(),
        learned_path: Some(dir.path().join("data").join("learned.json")),
        json: false,
    }
}

// ========== Input Tests ==========

#[test]
fn test_load_transactions_csv() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "tx.csv", TRANSACTIONS_CSV);

    let txs = input::load_transactions(&path).unwrap();
    assert_eq!(txs.len(), 4);
    assert_eq!(txs[0].account_id, "chk");
    assert_eq!(txs[2].category, None);
    assert_eq!(txs[3].tx_type, TransactionType::Income);
    assert_eq!(txs[3].date, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
}

#[test]
fn test_load_transactions_csv_bad_type() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "tx.csv",
        "id,name,amount,type,category,account_id,date\n1,Cafe,4.0,refund,,chk,2024-01-01\n",
    );

    let err = input::load_transactions(&path).unwrap_err();
    assert!(err.to_string().contains("Row 2"));
}

#[test]
fn test_load_transactions_json() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "tx.json",
        r#"[{"id":"a","name":"Cafe","amount":4.25,"type":"expense","date":{"seconds":1705320000}}]"#,
    );

    let txs = input::load_transactions(&path).unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
}

#[test]
fn test_load_budgets_and_accounts() {
    let dir = TempDir::new().unwrap();
    let budgets = write(&dir, "b.csv", "category,limit,spent\nFood,100,120\n");
    let accounts = write(&dir, "a.json", r#"[{"name":"Checking","balance":42.5}]"#);

    let budgets = input::load_budgets(&budgets).unwrap();
    assert_eq!(budgets[0].utilization(), Some(1.2));
    let accounts = input::load_accounts(&accounts).unwrap();
    assert_eq!(accounts[0].name, "Checking");
}

#[test]
fn test_missing_file_errors() {
    let dir = TempDir::new().unwrap();
    assert!(input::load_transactions(&dir.path().join("nope.json")).is_err());
}

// ========== Classifier Command Tests ==========

#[test]
fn test_cmd_learn_persists() {
    let dir = TempDir::new().unwrap();
    let ctx = test_context(&dir);

    commands::cmd_learn(&ctx, "Joe's Diner", Some("Dining"), false).unwrap();

    let path = ctx.learned_path.clone().unwrap();
    assert!(path.exists());
    let classifier = ctx.classifier().unwrap();
    let candidate = Candidate::new("JOES DINER", 20.0, TransactionType::Expense);
    assert_eq!(classifier.categorize(&candidate).as_deref(), Some("Dining"));
}

#[test]
fn test_cmd_learn_forget() {
    let dir = TempDir::new().unwrap();
    let ctx = test_context(&dir);

    commands::cmd_learn(&ctx, "Joe's Diner", Some("Dining"), false).unwrap();
    commands::cmd_learn(&ctx, "Joe's Diner", None, true).unwrap();

    assert!(ctx.classifier().unwrap().learned().is_empty());
}

#[test]
fn test_cmd_learn_requires_category() {
    let dir = TempDir::new().unwrap();
    let ctx = test_context(&dir);
    assert!(commands::cmd_learn(&ctx, "Joe's Diner", Some("  "), false).is_err());
}

#[test]
fn test_cmd_categorize() {
    let dir = TempDir::new().unwrap();
    let ctx = test_context(&dir);
    let path = write(&dir, "tx.csv", TRANSACTIONS_CSV);

    assert!(commands::cmd_categorize(&ctx, Some("Starbucks"), None, "expense").is_ok());
    assert!(commands::cmd_categorize(&ctx, None, Some(path.as_path()), "expense").is_ok());
    assert!(commands::cmd_categorize(&ctx, Some("Starbucks"), None, "refund").is_err());
    assert!(commands::cmd_categorize(&ctx, None, None, "expense").is_err());
}

// ========== Analysis Command Tests ==========

#[test]
fn test_analysis_commands() {
    let dir = TempDir::new().unwrap();
    let mut ctx = test_context(&dir);
    let tx = write(&dir, "tx.csv", TRANSACTIONS_CSV);
    let budgets = write(&dir, "b.json", r#"[{"category":"Coffee","limit":10,"spent":11}]"#);

    assert!(commands::cmd_duplicates(&ctx, &tx).is_ok());
    assert!(commands::cmd_patterns(&ctx, &tx).is_ok());
    assert!(commands::cmd_insights(&ctx, &tx, Some(budgets.as_path())).is_ok());

    ctx.json = true;
    assert!(commands::cmd_insights(&ctx, &tx, None).is_ok());
}

#[test]
fn test_notification_commands() {
    let dir = TempDir::new().unwrap();
    let ctx = test_context(&dir);
    let tx = write(&dir, "tx.csv", TRANSACTIONS_CSV);
    let accounts = write(&dir, "a.csv", "name,balance\nChecking,12.00\n");

    assert!(commands::cmd_daily(&ctx, &tx, None, Some(accounts.as_path()), None).is_ok());
    assert!(commands::cmd_weekly(&ctx, &tx, None).is_ok());

    let empty = write(&dir, "empty.json", "[]");
    assert!(commands::cmd_daily(&ctx, &empty, None, None, None).is_err());
}

#[test]
fn test_week_of_window() {
    let dir = TempDir::new().unwrap();
    let txs = input::load_transactions(&write(&dir, "tx.csv", TRANSACTIONS_CSV)).unwrap();

    let week = commands::week_of(&txs, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    assert_eq!(week.len(), 3);
    let next = commands::week_of(&txs, NaiveDate::from_ymd_opt(2024, 1, 17).unwrap());
    assert!(next.is_empty());
}

// ========== Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a much longer merchant name", 10), "a much ...");
}

#[test]
fn test_context_missing_config_errors() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.toml");
    assert!(Context::load(Some(missing.as_path()), None, false).is_err());
}
