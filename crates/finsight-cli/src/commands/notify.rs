//! Daily and weekly notification commands

use std::path::Path;

use anyhow::{Context as _, Result};
use chrono::{Duration, NaiveDate};

use finsight_core::{DuplicateDetector, NotificationGenerator, NotificationStore, Transaction};

use super::input::{load_accounts, load_optional_budgets, load_transactions};
use super::{print_json, print_notifications, Context};

fn generator(ctx: &Context) -> NotificationGenerator {
    NotificationGenerator::with_config(
        ctx.config.notifications.clone(),
        ctx.config.insights.clone(),
        DuplicateDetector::with_config(ctx.config.duplicates.clone()),
    )
}

fn latest_date(transactions: &[Transaction]) -> Option<NaiveDate> {
    transactions.iter().map(|t| t.date).max()
}

/// Transactions dated in `[start, start + 7 days)`
pub fn week_of(transactions: &[Transaction], start: NaiveDate) -> Vec<Transaction> {
    let end = start + Duration::days(7);
    transactions
        .iter()
        .filter(|t| t.date >= start && t.date < end)
        .cloned()
        .collect()
}

pub fn cmd_daily(
    ctx: &Context,
    file: &Path,
    date: Option<NaiveDate>,
    accounts: Option<&Path>,
    budgets: Option<&Path>,
) -> Result<()> {
    let transactions = load_transactions(file)?;
    let accounts = accounts.map(load_accounts).transpose()?.unwrap_or_default();
    let budgets = load_optional_budgets(budgets)?;
    let day = date
        .or_else(|| latest_date(&transactions))
        .context("No transactions to summarize; pass --date")?;

    let store = NotificationStore::new();
    let notifications =
        generator(ctx).daily_summary(&store, day, &transactions, &accounts, budgets.as_deref());

    if ctx.json {
        return print_json(&notifications);
    }

    println!("📅 Daily summary for {}", day);
    println!("   ─────────────────────────────");
    print_notifications(&notifications);
    Ok(())
}

pub fn cmd_weekly(ctx: &Context, file: &Path, week_start: Option<NaiveDate>) -> Result<()> {
    let transactions = load_transactions(file)?;
    let start = week_start
        .or_else(|| latest_date(&transactions).map(|d| d - Duration::days(6)))
        .context("No transactions to compare; pass --week-start")?;

    let current = week_of(&transactions, start);
    let previous = week_of(&transactions, start - Duration::days(7));

    let store = NotificationStore::new();
    let notifications = generator(ctx).weekly_insights(&store, &current, &previous);

    if ctx.json {
        return print_json(&notifications);
    }

    println!(
        "🗓️  Week of {} ({} transactions, {} the week before)",
        start,
        current.len(),
        previous.len()
    );
    println!("   ─────────────────────────────");
    print_notifications(&notifications);
    Ok(())
}
