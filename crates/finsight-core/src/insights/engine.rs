//! Insight Generator - runs insight rules over a transaction snapshot

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Budget, Transaction};
use crate::patterns::{
    usable_expenses, OutlierReport, PatternConfig, SpendingAnalyzer, SpendingPattern,
};

use super::types::SpendingInsight;
use super::{AnomalyRule, BudgetRule, CategoryPatternRule, MonthlyTrendRule};

/// Insight thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// Weekly frequency a category must exceed to earn a frequency tip
    pub frequency_threshold: f64,
    /// Expenses above this amount are "large"
    pub large_transaction_threshold: f64,
    /// Budget utilization above this ratio (and up to 1.0) is "nearing the limit"
    pub budget_warning_ratio: f64,
    /// Months of history compared by the monthly trend rule
    pub monthly_trend_months: usize,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            frequency_threshold: 2.0,
            large_transaction_threshold: 1000.0,
            budget_warning_ratio: 0.8,
            monthly_trend_months: 3,
        }
    }
}

/// Identifies a rule for logging and introspection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightRuleId {
    CategoryPatterns,
    Budgets,
    MonthlyTrend,
    Anomalies,
}

impl InsightRuleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightRuleId::CategoryPatterns => "category_patterns",
            InsightRuleId::Budgets => "budgets",
            InsightRuleId::MonthlyTrend => "monthly_trend",
            InsightRuleId::Anomalies => "anomalies",
        }
    }
}

/// Everything a rule may look at, computed once per `generate` call
pub struct InsightContext<'a> {
    /// Well-formed expenses, in input order
    pub expenses: Vec<&'a Transaction>,
    /// Per-category patterns, largest total first
    pub patterns: Vec<SpendingPattern>,
    /// Amount outliers across all expenses
    pub outliers: OutlierReport,
    pub budgets: Option<&'a [Budget]>,
    pub config: &'a InsightConfig,
    pub pattern_config: &'a PatternConfig,
}

/// A source of insights
pub trait InsightRule: Send + Sync {
    /// Unique identifier for this rule
    fn id(&self) -> InsightRuleId;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Produce insights for the snapshot in `ctx`
    fn evaluate(&self, ctx: &InsightContext<'_>) -> Vec<SpendingInsight>;
}

/// Runs registered rules in order and ranks their output by confidence
pub struct InsightGenerator {
    rules: Vec<Box<dyn InsightRule>>,
    analyzer: SpendingAnalyzer,
    config: InsightConfig,
}

impl Default for InsightGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightGenerator {
    /// Create a generator with the built-in rules and default thresholds
    pub fn new() -> Self {
        Self::with_config(InsightConfig::default(), PatternConfig::default())
    }

    pub fn with_config(config: InsightConfig, pattern_config: PatternConfig) -> Self {
        let mut generator = Self {
            rules: vec![],
            analyzer: SpendingAnalyzer::with_config(pattern_config),
            config,
        };

        // Registration order is the tie order for equal confidences
        generator.register(Box::new(CategoryPatternRule));
        generator.register(Box::new(BudgetRule));
        generator.register(Box::new(MonthlyTrendRule));
        generator.register(Box::new(AnomalyRule));

        generator
    }

    /// Register an additional rule; it runs after the existing ones
    pub fn register(&mut self, rule: Box<dyn InsightRule>) {
        self.rules.push(rule);
    }

    /// Ids of registered rules, in evaluation order
    pub fn rule_ids(&self) -> Vec<InsightRuleId> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    /// Insights for a transaction snapshot, highest confidence first.
    ///
    /// The sort is stable: equal confidences keep rule order. Output depends
    /// only on the inputs, never on the current time.
    pub fn generate(
        &self,
        transactions: &[Transaction],
        budgets: Option<&[Budget]>,
    ) -> Vec<SpendingInsight> {
        if transactions.is_empty() {
            return Vec::new();
        }

        let ctx = InsightContext {
            expenses: usable_expenses(transactions).collect(),
            patterns: self.analyzer.analyze(transactions),
            outliers: self.analyzer.detect_outliers(transactions),
            budgets,
            config: &self.config,
            pattern_config: self.analyzer.config(),
        };

        let mut insights = Vec::new();
        for rule in &self.rules {
            let produced = rule.evaluate(&ctx);
            debug!(
                rule = rule.id().as_str(),
                count = produced.len(),
                "Insight rule evaluated"
            );
            insights.extend(produced);
        }

        insights.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        insights
    }
}
