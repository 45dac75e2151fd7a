//! Large-transaction and statistical outlier insights

use crate::models::{format_currency, Transaction};

use super::engine::{InsightContext, InsightRule, InsightRuleId};
use super::types::{InsightKind, SpendingInsight};

const LARGE_TRANSACTION_CONFIDENCE: f64 = 0.7;
const OUTLIER_CONFIDENCE: f64 = 0.6;

pub struct AnomalyRule;

impl InsightRule for AnomalyRule {
    fn id(&self) -> InsightRuleId {
        InsightRuleId::Anomalies
    }

    fn name(&self) -> &'static str {
        "Anomalies"
    }

    fn evaluate(&self, ctx: &InsightContext<'_>) -> Vec<SpendingInsight> {
        let mut insights = Vec::new();

        // Strict comparison keeps the first of equal amounts
        let threshold = ctx.config.large_transaction_threshold;
        let largest = ctx
            .expenses
            .iter()
            .filter(|t| t.amount > threshold)
            .fold(None, |best: Option<&&Transaction>, t| match best {
                Some(b) if b.amount >= t.amount => Some(b),
                _ => Some(t),
            });

        if let Some(tx) = largest {
            insights.push(SpendingInsight::new(
                InsightKind::Info,
                "Large transaction",
                format!(
                    "{} for {} on {} is your largest expense above {}.",
                    tx.name,
                    format_currency(tx.amount),
                    tx.date.format("%b %-d, %Y"),
                    format_currency(threshold)
                ),
                LARGE_TRANSACTION_CONFIDENCE,
            ));
        }

        let count = ctx.outliers.outliers.len();
        if count > 0 {
            let noun = if count == 1 { "transaction" } else { "transactions" };
            insights.push(
                SpendingInsight::new(
                    InsightKind::Tip,
                    "Unusual transactions",
                    format!(
                        "{} {} differ sharply from your typical spending of about {}.",
                        count,
                        noun,
                        format_currency(ctx.outliers.mean)
                    ),
                    OUTLIER_CONFIDENCE,
                )
                .with_action("Review transactions", "/transactions"),
            );
        }

        insights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::InsightGenerator;
    use crate::models::TransactionType;
    use chrono::NaiveDate;

    fn expense(id: &str, name: &str, amount: f64, day: u32) -> Transaction {
        Transaction::new(
            id,
            name,
            amount,
            TransactionType::Expense,
            NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
        )
        .with_category("Shopping")
    }

    fn titled<'a>(insights: &'a [SpendingInsight], title: &str) -> Vec<&'a SpendingInsight> {
        insights.iter().filter(|i| i.title == title).collect()
    }

    #[test]
    fn test_single_largest_transaction_reported() {
        let txs = vec![
            expense("1", "Laptop", 1200.0, 1),
            expense("2", "Couch", 1800.0, 2),
            expense("3", "Snacks", 8.0, 3),
        ];
        let insights = InsightGenerator::new().generate(&txs, None);
        let large = titled(&insights, "Large transaction");

        assert_eq!(large.len(), 1);
        assert_eq!(large[0].kind, InsightKind::Info);
        assert_eq!(large[0].confidence, 0.7);
        assert!(large[0].message.starts_with("Couch"));
    }

    #[test]
    fn test_below_threshold_never_large() {
        let txs = vec![expense("1", "Phone", 999.99, 1), expense("2", "Case", 1000.0, 2)];
        let insights = InsightGenerator::new().generate(&txs, None);
        assert!(titled(&insights, "Large transaction").is_empty());
    }

    #[test]
    fn test_outliers_summarized_once() {
        let mut txs: Vec<Transaction> = (1..=9)
            .map(|d| expense(&d.to_string(), "Coffee", 10.0, d))
            .collect();
        txs.push(expense("10", "TV", 1500.0, 10));

        let insights = InsightGenerator::new().generate(&txs, None);
        let unusual = titled(&insights, "Unusual transactions");

        assert_eq!(unusual.len(), 1);
        assert_eq!(unusual[0].kind, InsightKind::Tip);
        assert_eq!(unusual[0].confidence, 0.6);
        assert!(unusual[0].message.starts_with("1 transaction "));
    }

    #[test]
    fn test_uniform_amounts_have_no_outliers() {
        let txs: Vec<Transaction> = (1..=5)
            .map(|d| expense(&d.to_string(), "Coffee", 10.0, d))
            .collect();
        let insights = InsightGenerator::new().generate(&txs, None);
        assert!(titled(&insights, "Unusual transactions").is_empty());
    }
}
