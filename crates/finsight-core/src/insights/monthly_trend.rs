//! Month-over-month spending trend

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::patterns::{classify_trend, Trend};

use super::engine::{InsightContext, InsightRule, InsightRuleId};
use super::types::{InsightKind, SpendingInsight};

const INCREASING_CONFIDENCE: f64 = 0.8;
const DECREASING_CONFIDENCE: f64 = 0.9;

pub struct MonthlyTrendRule;

/// Expense totals keyed by (year, month), oldest first
fn monthly_totals(ctx: &InsightContext<'_>) -> BTreeMap<(i32, u32), f64> {
    let mut totals = BTreeMap::new();
    for tx in &ctx.expenses {
        *totals.entry((tx.date.year(), tx.date.month())).or_insert(0.0) += tx.amount;
    }
    totals
}

impl InsightRule for MonthlyTrendRule {
    fn id(&self) -> InsightRuleId {
        InsightRuleId::MonthlyTrend
    }

    fn name(&self) -> &'static str {
        "Monthly Trend"
    }

    fn evaluate(&self, ctx: &InsightContext<'_>) -> Vec<SpendingInsight> {
        let window = ctx.config.monthly_trend_months;
        let totals = monthly_totals(ctx);
        if window == 0 || totals.len() < window {
            return vec![];
        }

        let recent: Vec<f64> = totals.values().skip(totals.len() - window).copied().collect();

        match classify_trend(&recent, ctx.pattern_config.trend_threshold) {
            Trend::Increasing => vec![SpendingInsight::new(
                InsightKind::Warning,
                "Monthly spending is up",
                format!(
                    "Your spending has been increasing over the last {} months.",
                    window
                ),
                INCREASING_CONFIDENCE,
            )
            .with_action("View trends", "/analytics")],
            Trend::Decreasing => vec![SpendingInsight::new(
                InsightKind::Success,
                "Monthly spending is down",
                format!(
                    "Nice work! Your spending has been decreasing over the last {} months.",
                    window
                ),
                DECREASING_CONFIDENCE,
            )],
            Trend::Stable => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::InsightGenerator;
    use crate::models::{Transaction, TransactionType};
    use chrono::NaiveDate;

    fn monthly(amounts: &[(u32, f64)]) -> Vec<Transaction> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, (month, amount))| {
                Transaction::new(
                    format!("m{}", i),
                    "Utility Co",
                    *amount,
                    TransactionType::Expense,
                    NaiveDate::from_ymd_opt(2024, *month, 10).unwrap(),
                )
                .with_category("Utilities")
            })
            .collect()
    }

    fn monthly_insights(txs: &[Transaction]) -> Vec<SpendingInsight> {
        InsightGenerator::new()
            .generate(txs, None)
            .into_iter()
            .filter(|i| i.title.starts_with("Monthly spending"))
            .collect()
    }

    #[test]
    fn test_increasing_months_warn() {
        let insights = monthly_insights(&monthly(&[(1, 100.0), (2, 100.0), (3, 300.0)]));
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightKind::Warning);
        assert_eq!(insights[0].confidence, 0.8);
    }

    #[test]
    fn test_decreasing_months_succeed() {
        let insights = monthly_insights(&monthly(&[(1, 300.0), (2, 300.0), (3, 100.0)]));
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightKind::Success);
        assert_eq!(insights[0].confidence, 0.9);
    }

    #[test]
    fn test_only_last_three_months_count() {
        // January's spike is outside the window; Feb..Apr is flat
        let insights = monthly_insights(&monthly(&[
            (1, 900.0),
            (2, 100.0),
            (3, 100.0),
            (4, 100.0),
        ]));
        assert!(insights.is_empty());
    }

    #[test]
    fn test_needs_three_months() {
        let insights = monthly_insights(&monthly(&[(1, 100.0), (2, 500.0)]));
        assert!(insights.is_empty());
    }
}
