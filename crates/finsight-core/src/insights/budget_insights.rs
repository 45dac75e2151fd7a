//! Budget utilization insights

use crate::models::format_currency;

use super::engine::{InsightContext, InsightRule, InsightRuleId};
use super::types::{InsightKind, SpendingInsight};

const EXCEEDED_CONFIDENCE: f64 = 1.0;
const NEARING_CONFIDENCE: f64 = 0.9;

pub struct BudgetRule;

impl InsightRule for BudgetRule {
    fn id(&self) -> InsightRuleId {
        InsightRuleId::Budgets
    }

    fn name(&self) -> &'static str {
        "Budgets"
    }

    fn evaluate(&self, ctx: &InsightContext<'_>) -> Vec<SpendingInsight> {
        let Some(budgets) = ctx.budgets else {
            return vec![];
        };

        let mut insights = Vec::new();
        for budget in budgets {
            // Unusable limits are skipped
            let Some(ratio) = budget.utilization() else {
                continue;
            };

            if ratio > 1.0 {
                let over = budget.spent - budget.limit;
                insights.push(
                    SpendingInsight::new(
                        InsightKind::Warning,
                        format!("{} budget exceeded", budget.category),
                        format!(
                            "You've spent {} of your {} {} budget ({} over).",
                            format_currency(budget.spent),
                            format_currency(budget.limit),
                            budget.category,
                            format_currency(over)
                        ),
                        EXCEEDED_CONFIDENCE,
                    )
                    .with_action("Adjust budget", "/budgets"),
                );
            } else if ratio > ctx.config.budget_warning_ratio {
                insights.push(SpendingInsight::new(
                    InsightKind::Info,
                    format!("{} budget almost used", budget.category),
                    format!(
                        "You've used {:.0}% of your {} budget, with {} remaining.",
                        ratio * 100.0,
                        budget.category,
                        format_currency(budget.limit - budget.spent)
                    ),
                    NEARING_CONFIDENCE,
                ));
            }
        }

        insights
    }
}
