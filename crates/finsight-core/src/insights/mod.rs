//! Insight generation
//!
//! Turns a transaction snapshot (and optional budgets) into ranked advisory
//! insights. Each insight source is an [`InsightRule`]; the
//! [`InsightGenerator`] evaluates them in registration order and sorts the
//! combined output by confidence.
//!
//! Built-in rules:
//! - [`CategoryPatternRule`]: dominant category, frequent spending, rising categories
//! - [`BudgetRule`]: exceeded and nearly-used budgets
//! - [`MonthlyTrendRule`]: month-over-month direction
//! - [`AnomalyRule`]: largest big-ticket expense and statistical outliers

mod anomaly_insights;
mod budget_insights;
mod category_insights;
mod engine;
mod monthly_trend;
mod types;

pub use anomaly_insights::AnomalyRule;
pub use budget_insights::BudgetRule;
pub use category_insights::CategoryPatternRule;
pub use engine::{InsightConfig, InsightContext, InsightGenerator, InsightRule, InsightRuleId};
pub use monthly_trend::MonthlyTrendRule;
pub use types::{InsightKind, SpendingInsight};
