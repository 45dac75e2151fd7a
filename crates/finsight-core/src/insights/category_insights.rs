//! Category pattern insights
//!
//! - Dominance: the category with the largest total (info)
//! - Frequency: the most frequent category above the weekly threshold (tip)
//! - Rising spending: one summary of all increasing categories (warning)

use crate::models::format_currency;
use crate::patterns::{SpendingPattern, Trend};

use super::engine::{InsightContext, InsightRule, InsightRuleId};
use super::types::{InsightKind, SpendingInsight};

const DOMINANCE_CONFIDENCE: f64 = 0.9;
const FREQUENCY_CONFIDENCE: f64 = 0.8;
const RISING_CONFIDENCE: f64 = 0.85;

pub struct CategoryPatternRule;

impl InsightRule for CategoryPatternRule {
    fn id(&self) -> InsightRuleId {
        InsightRuleId::CategoryPatterns
    }

    fn name(&self) -> &'static str {
        "Category Patterns"
    }

    fn evaluate(&self, ctx: &InsightContext<'_>) -> Vec<SpendingInsight> {
        let mut insights = Vec::new();

        let total: f64 = ctx.patterns.iter().map(|p| p.total_spent).sum();

        // Patterns are sorted by total, so the first is the dominant category
        if let Some(top) = ctx.patterns.first().filter(|p| p.total_spent > 0.0) {
            let share = if total > 0.0 {
                top.total_spent / total * 100.0
            } else {
                0.0
            };
            insights.push(SpendingInsight::new(
                InsightKind::Info,
                "Top spending category",
                format!(
                    "{} is your largest expense category at {} ({:.0}% of spending).",
                    top.category,
                    format_currency(top.total_spent),
                    share
                ),
                DOMINANCE_CONFIDENCE,
            ));
        }

        let frequent = ctx
            .patterns
            .iter()
            .filter(|p| p.frequency > ctx.config.frequency_threshold)
            .fold(None, |best: Option<&SpendingPattern>, p| match best {
                Some(b) if b.frequency >= p.frequency => Some(b),
                _ => Some(p),
            });
        if let Some(p) = frequent {
            insights.push(
                SpendingInsight::new(
                    InsightKind::Tip,
                    format!("Frequent spending: {}", p.category),
                    format!(
                        "You spend on {} about {:.1} times a week, averaging {} each time. A weekly limit could help.",
                        p.category,
                        p.frequency,
                        format_currency(p.average_amount)
                    ),
                    FREQUENCY_CONFIDENCE,
                )
                .with_action("Set a limit", "/budgets"),
            );
        }

        let rising: Vec<&str> = ctx
            .patterns
            .iter()
            .filter(|p| p.trend == Trend::Increasing)
            .map(|p| p.category.as_str())
            .collect();
        if !rising.is_empty() {
            let noun = if rising.len() == 1 { "category" } else { "categories" };
            insights.push(
                SpendingInsight::new(
                    InsightKind::Warning,
                    "Spending is rising",
                    format!(
                        "Spending is increasing in {} {}: {}.",
                        rising.len(),
                        noun,
                        rising.join(", ")
                    ),
                    RISING_CONFIDENCE,
                )
                .with_action("Review categories", "/analytics"),
            );
        }

        insights
    }
}
