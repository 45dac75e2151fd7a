//! Spending pattern analysis
//!
//! Aggregates expense transactions into per-category statistics and flags
//! amount outliers across all expenses. Everything here is recomputed from
//! the snapshot passed in; nothing is cached between calls.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::Transaction;

/// Pattern analysis thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Relative change between half-means that counts as a trend (0.10 = 10%)
    pub trend_threshold: f64,
    /// Fewer points than this are always `stable`
    pub min_trend_points: usize,
    /// Standard deviations from the mean that make an amount an outlier
    pub outlier_std_devs: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            trend_threshold: 0.10,
            min_trend_points: 3,
            outlier_std_devs: 2.0,
        }
    }
}

/// Direction of a category's spending over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-category spending statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingPattern {
    pub category: String,
    pub average_amount: f64,
    /// Transactions per week over the category's date span
    pub frequency: f64,
    pub trend: Trend,
    pub total_spent: f64,
    pub transaction_count: usize,
    pub last_transaction_date: NaiveDate,
}

/// Outlier statistics over all expense amounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlierReport {
    pub mean: f64,
    pub std_dev: f64,
    pub outliers: Vec<Transaction>,
}

/// Spending pattern analyzer
#[derive(Debug, Clone, Default)]
pub struct SpendingAnalyzer {
    config: PatternConfig,
}

impl SpendingAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PatternConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    /// One pattern per category, largest total first (ties by category name).
    ///
    /// Income and malformed transactions are ignored.
    pub fn analyze(&self, transactions: &[Transaction]) -> Vec<SpendingPattern> {
        let mut by_category: BTreeMap<&str, Vec<&Transaction>> = BTreeMap::new();
        for tx in usable_expenses(transactions) {
            by_category.entry(tx.category_label()).or_default().push(tx);
        }

        let mut patterns: Vec<SpendingPattern> = by_category
            .into_iter()
            .filter_map(|(category, mut txs)| {
                txs.sort_by_key(|t| t.date);
                let first = txs.first()?.date;
                let last = txs.last()?.date;

                let amounts: Vec<f64> = txs.iter().map(|t| t.amount).collect();
                let total: f64 = amounts.iter().sum();
                let count = amounts.len();

                let weeks = ((last - first).num_days() as f64 / 7.0).max(1.0);

                Some(SpendingPattern {
                    category: category.to_string(),
                    average_amount: total / count as f64,
                    frequency: count as f64 / weeks,
                    trend: self.trend(&amounts),
                    total_spent: total,
                    transaction_count: count,
                    last_transaction_date: last,
                })
            })
            .collect();

        patterns.sort_by(|a, b| {
            b.total_spent
                .partial_cmp(&a.total_spent)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.category.cmp(&b.category))
        });

        debug!(categories = patterns.len(), "Spending patterns analyzed");
        patterns
    }

    /// Trend of a chronological series using the configured thresholds
    pub fn trend(&self, values: &[f64]) -> Trend {
        if values.len() < self.config.min_trend_points {
            return Trend::Stable;
        }
        classify_trend(values, self.config.trend_threshold)
    }

    /// Expenses more than `outlier_std_devs` population standard deviations
    /// from the mean of all expense amounts
    pub fn detect_outliers(&self, transactions: &[Transaction]) -> OutlierReport {
        let expenses: Vec<&Transaction> = usable_expenses(transactions).collect();
        let amounts: Vec<f64> = expenses.iter().map(|t| t.amount).collect();

        let mean = mean(&amounts);
        let std_dev = population_std_dev(&amounts, mean);

        let outliers = if std_dev > 0.0 {
            let limit = self.config.outlier_std_devs * std_dev;
            expenses
                .into_iter()
                .filter(|t| (t.amount - mean).abs() > limit)
                .cloned()
                .collect()
        } else {
            Vec::new()
        };

        OutlierReport {
            mean,
            std_dev,
            outliers,
        }
    }
}

/// First-half vs second-half mean comparison over a chronological series.
///
/// Odd lengths keep the middle element in the first half. A non-positive
/// first-half mean yields `Stable`.
pub fn classify_trend(values: &[f64], threshold: f64) -> Trend {
    if values.len() < 2 {
        return Trend::Stable;
    }

    let split = values.len().div_ceil(2);
    let first_mean = mean(&values[..split]);
    let second_mean = mean(&values[split..]);
    if first_mean <= 0.0 {
        return Trend::Stable;
    }

    let change = (second_mean - first_mean) / first_mean;
    if change > threshold {
        Trend::Increasing
    } else if change < -threshold {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

/// Well-formed expense transactions; malformed ones are logged and dropped
pub(crate) fn usable_expenses(transactions: &[Transaction]) -> impl Iterator<Item = &Transaction> {
    transactions.iter().filter(|t| {
        if !t.is_expense() {
            return false;
        }
        if !t.is_well_formed() {
            warn!(id = %t.id, amount = t.amount, "Skipping malformed transaction");
            return false;
        }
        true
    })
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation; 0 with fewer than two values
fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TransactionType, UNCATEGORIZED};

    fn expense(id: &str, category: Option<&str>, amount: f64, date: &str) -> Transaction {
        let tx = Transaction::new(
            id,
            format!("tx {}", id),
            amount,
            TransactionType::Expense,
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        );
        match category {
            Some(c) => tx.with_category(c),
            None => tx,
        }
    }

    #[test]
    fn test_analyze_empty() {
        assert!(SpendingAnalyzer::new().analyze(&[]).is_empty());
    }

    #[test]
    fn test_analyze_basic_stats() {
        let txs = vec![
            expense("1", Some("Food"), 10.0, "2024-01-01"),
            expense("2", Some("Food"), 20.0, "2024-01-15"),
            expense("3", Some("Food"), 30.0, "2024-01-29"),
            expense("4", Some("Rent"), 900.0, "2024-01-01"),
        ];
        let patterns = SpendingAnalyzer::new().analyze(&txs);

        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].category, "Rent");
        let food = &patterns[1];
        assert_eq!(food.total_spent, 60.0);
        assert_eq!(food.average_amount, 20.0);
        assert_eq!(food.transaction_count, 3);
        // 28 days = 4 weeks
        assert_eq!(food.frequency, 0.75);
        assert_eq!(food.trend, Trend::Increasing);
        assert_eq!(
            food.last_transaction_date,
            NaiveDate::from_ymd_opt(2024, 1, 29).unwrap()
        );
    }

    #[test]
    fn test_single_transaction_frequency_and_trend() {
        let patterns =
            SpendingAnalyzer::new().analyze(&[expense("1", Some("Gifts"), 40.0, "2024-03-01")]);
        assert_eq!(patterns[0].frequency, 1.0);
        assert_eq!(patterns[0].trend, Trend::Stable);
    }

    #[test]
    fn test_missing_category_is_uncategorized() {
        let patterns = SpendingAnalyzer::new().analyze(&[
            expense("1", None, 5.0, "2024-03-01"),
            expense("2", Some(""), 5.0, "2024-03-02"),
        ]);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].category, UNCATEGORIZED);
        assert_eq!(patterns[0].transaction_count, 2);
    }

    #[test]
    fn test_income_and_malformed_ignored() {
        let mut income = expense("1", Some("Salary"), 3000.0, "2024-03-01");
        income.tx_type = TransactionType::Income;
        let negative = expense("2", Some("Food"), -5.0, "2024-03-01");
        let patterns = SpendingAnalyzer::new().analyze(&[income, negative]);
        assert!(patterns.is_empty());
    }

    #[test]
    fn test_trend_uses_chronological_order() {
        let txs = vec![
            expense("4", Some("Fuel"), 50.0, "2024-01-04"),
            expense("1", Some("Fuel"), 10.0, "2024-01-01"),
            expense("5", Some("Fuel"), 50.0, "2024-01-05"),
            expense("2", Some("Fuel"), 10.0, "2024-01-02"),
            expense("6", Some("Fuel"), 50.0, "2024-01-06"),
            expense("3", Some("Fuel"), 10.0, "2024-01-03"),
        ];
        let patterns = SpendingAnalyzer::new().analyze(&txs);
        assert_eq!(patterns[0].trend, Trend::Increasing);
    }

    #[test]
    fn test_classify_trend() {
        assert_eq!(
            classify_trend(&[10.0, 10.0, 10.0, 50.0, 50.0, 50.0], 0.10),
            Trend::Increasing
        );
        assert_eq!(classify_trend(&[50.0, 50.0, 10.0, 10.0], 0.10), Trend::Decreasing);
        assert_eq!(classify_trend(&[100.0, 105.0, 108.0, 104.0], 0.10), Trend::Stable);
        // odd length: [10, 10, 10] vs [12, 12] -> +20%
        assert_eq!(
            classify_trend(&[10.0, 10.0, 10.0, 12.0, 12.0], 0.10),
            Trend::Increasing
        );
        assert_eq!(classify_trend(&[0.0, 0.0, 5.0], 0.10), Trend::Stable);
    }

    #[test]
    fn test_fewer_than_three_points_is_stable() {
        let analyzer = SpendingAnalyzer::new();
        assert_eq!(analyzer.trend(&[10.0, 100.0]), Trend::Stable);
    }

    #[test]
    fn test_detect_outliers() {
        let mut txs: Vec<Transaction> = (0..10)
            .map(|i| expense(&i.to_string(), Some("Food"), 10.0, "2024-01-01"))
            .collect();
        txs.push(expense("big", Some("Travel"), 500.0, "2024-01-02"));

        let report = SpendingAnalyzer::new().detect_outliers(&txs);
        assert_eq!(report.outliers.len(), 1);
        assert_eq!(report.outliers[0].id, "big");
        assert!(report.std_dev > 0.0);
    }

    #[test]
    fn test_outliers_need_two_points() {
        let report =
            SpendingAnalyzer::new().detect_outliers(&[expense("1", None, 99.0, "2024-01-01")]);
        assert_eq!(report.std_dev, 0.0);
        assert!(report.outliers.is_empty());

        let empty = SpendingAnalyzer::new().detect_outliers(&[]);
        assert_eq!(empty.mean, 0.0);
        assert!(empty.outliers.is_empty());
    }
}
