//! Snapshot file loading
//!
//! Transactions, budgets and accounts are read from `.json` arrays or from
//! `.csv` files with a header row. Transaction CSVs use the columns
//! `id,name,amount,type,category,account_id,date`.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use finsight_core::models::ExternalDate;
use finsight_core::{AccountBalance, Budget, Transaction, TransactionType};

#[derive(Debug, Deserialize)]
struct TransactionRow {
    id: String,
    name: String,
    amount: f64,
    #[serde(rename = "type")]
    tx_type: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    account_id: Option<String>,
    date: String,
}

impl TransactionRow {
    fn into_transaction(self, line: usize) -> Result<Transaction> {
        let tx_type: TransactionType = self
            .tx_type
            .parse()
            .map_err(|e: String| anyhow!("Row {}: {}", line, e))?;
        let date = ExternalDate::Text(self.date)
            .to_date()
            .with_context(|| format!("Row {}: bad date", line))?;

        let mut tx = Transaction::new(self.id, self.name, self.amount, tx_type, date);
        tx.category = self.category.filter(|c| !c.trim().is_empty());
        if let Some(account) = self.account_id {
            tx = tx.with_account(account);
        }
        Ok(tx)
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut rows = Vec::new();
    for (i, record) in reader.deserialize().enumerate() {
        // Header is line 1
        let row: T = record.with_context(|| format!("{}: bad row {}", path.display(), i + 2))?;
        rows.push(row);
    }
    Ok(rows)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Read records from a `.csv` or JSON file
fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if is_csv(path) {
        read_csv(path)
    } else {
        read_json(path)
    }
}

pub fn load_transactions(path: &Path) -> Result<Vec<Transaction>> {
    let transactions = if is_csv(path) {
        read_csv::<TransactionRow>(path)?
            .into_iter()
            .enumerate()
            .map(|(i, row)| row.into_transaction(i + 2))
            .collect::<Result<Vec<_>>>()?
    } else {
        read_json(path)?
    };

    debug!(count = transactions.len(), file = %path.display(), "Transactions loaded");
    Ok(transactions)
}

pub fn load_budgets(path: &Path) -> Result<Vec<Budget>> {
    read_records(path)
}

pub fn load_accounts(path: &Path) -> Result<Vec<AccountBalance>> {
    read_records(path)
}

/// Budgets from an optional file
pub fn load_optional_budgets(path: Option<&Path>) -> Result<Option<Vec<Budget>>> {
    path.map(load_budgets).transpose()
}
