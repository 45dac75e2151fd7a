//! Notification generators
//!
//! Each entry point builds notifications for one kind of event, appends them
//! to the given store and returns the ones that were added. Callers should
//! not add the returned notifications again.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use tracing::{debug, warn};

use crate::classifier::CategoryClassifier;
use crate::duplicates::DuplicateDetector;
use crate::insights::{InsightConfig, InsightKind, SpendingInsight};
use crate::models::{
    format_currency, AccountBalance, Budget, Transaction, TransactionType, UNCATEGORIZED,
};
use crate::patterns::usable_expenses;

use super::store::NotificationStore;
use super::types::{NotificationKind, Priority, SmartNotification};
use super::NotificationConfig;

const INSIGHTS_CATEGORY: &str = "insights";
const TRANSACTIONS_CATEGORY: &str = "transactions";
const BUDGETS_CATEGORY: &str = "budgets";
const DAILY_CATEGORY: &str = "daily";
const WEEKLY_CATEGORY: &str = "weekly";

fn ttl(hours: u64) -> Option<Duration> {
    if hours == 0 {
        return None;
    }
    i64::try_from(hours).ok().and_then(Duration::try_hours)
}

pub struct NotificationGenerator {
    config: NotificationConfig,
    insight_config: InsightConfig,
    detector: DuplicateDetector,
}

impl Default for NotificationGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationGenerator {
    pub fn new() -> Self {
        Self::with_config(
            NotificationConfig::default(),
            InsightConfig::default(),
            DuplicateDetector::new(),
        )
    }

    /// Budget and large-transaction thresholds come from `insight_config`
    pub fn with_config(
        config: NotificationConfig,
        insight_config: InsightConfig,
        detector: DuplicateDetector,
    ) -> Self {
        Self {
            config,
            insight_config,
            detector,
        }
    }

    pub fn config(&self) -> &NotificationConfig {
        &self.config
    }

    fn publish(
        &self,
        store: &NotificationStore,
        notifications: Vec<SmartNotification>,
        ttl_hours: u64,
    ) -> Vec<SmartNotification> {
        let lifetime = ttl(ttl_hours);
        notifications
            .into_iter()
            .map(|n| match lifetime {
                Some(d) => n.with_ttl(d),
                None => n,
            })
            .filter(|n| store.add(n.clone()))
            .collect()
    }

    /// Wrap insights as notifications, keeping their order
    pub fn from_insights(
        &self,
        store: &NotificationStore,
        insights: &[SpendingInsight],
    ) -> Vec<SmartNotification> {
        let notifications = insights
            .iter()
            .map(|insight| {
                let kind = match insight.kind {
                    InsightKind::Warning => NotificationKind::Warning,
                    InsightKind::Success => NotificationKind::Success,
                    InsightKind::Info | InsightKind::Tip => NotificationKind::Info,
                };
                SmartNotification::from_insight(insight, kind, INSIGHTS_CATEGORY)
            })
            .collect();

        self.publish(store, notifications, self.config.insight_ttl_hours)
    }

    /// Notifications for one new transaction checked against `history`
    pub fn for_transaction(
        &self,
        store: &NotificationStore,
        tx: &Transaction,
        history: &[Transaction],
        budgets: Option<&[Budget]>,
        classifier: &CategoryClassifier,
    ) -> Vec<SmartNotification> {
        if !tx.is_well_formed() {
            warn!(
                id = %tx.id,
                amount = tx.amount,
                "Skipping notifications for malformed transaction"
            );
            return vec![];
        }

        let mut notifications = Vec::new();
        let amount = format_currency(tx.amount);

        let duplicate = self.detector.detect(tx, history);
        if duplicate.is_duplicate {
            notifications.push(
                SmartNotification::new(
                    NotificationKind::Warning,
                    "Possible duplicate transaction",
                    format!(
                        "{} for {} looks like a duplicate: {}.",
                        tx.name, amount, duplicate.reason
                    ),
                    TRANSACTIONS_CATEGORY,
                )
                .with_priority(Priority::High)
                .with_action("Review transaction", "/transactions"),
            );
        }

        if tx.is_expense() {
            if let Some(n) = budgets.and_then(|b| self.budget_alert(tx, b)) {
                notifications.push(n);
            }

            if tx.amount > self.insight_config.large_transaction_threshold {
                notifications.push(
                    SmartNotification::new(
                        NotificationKind::Info,
                        "Large transaction",
                        format!("{} charged {}.", tx.name, amount),
                        TRANSACTIONS_CATEGORY,
                    )
                    .with_priority(Priority::Medium),
                );
            }
        }

        if tx.category_label() == UNCATEGORIZED {
            let candidate = tx.as_candidate();
            if let Some(category) = classifier.categorize(&candidate) {
                notifications.push(
                    SmartNotification::new(
                        NotificationKind::Info,
                        "Category suggestion",
                        format!(
                            "{} looks like {} ({:.0}% confident).",
                            tx.name,
                            category,
                            classifier.confidence(&candidate) * 100.0
                        ),
                        TRANSACTIONS_CATEGORY,
                    )
                    .with_priority(Priority::Low)
                    .with_action("Categorize", "/transactions"),
                );
            }
        }

        if tx.tx_type == TransactionType::Income {
            notifications.push(
                SmartNotification::new(
                    NotificationKind::Success,
                    "Income received",
                    format!("{} received from {}.", amount, tx.name),
                    TRANSACTIONS_CATEGORY,
                )
                .with_priority(Priority::Low),
            );
        }

        debug!(id = %tx.id, count = notifications.len(), "Transaction notifications built");
        self.publish(store, notifications, self.config.transaction_ttl_hours)
    }

    /// Budgets are a snapshot from before `tx`, so its amount is added on top
    fn budget_alert(&self, tx: &Transaction, budgets: &[Budget]) -> Option<SmartNotification> {
        let category = tx.category_label();
        let budget = budgets
            .iter()
            .find(|b| b.category.eq_ignore_ascii_case(category))?;
        let projected = Budget::new(&budget.category, budget.limit, budget.spent + tx.amount);
        let ratio = projected.utilization()?;

        if ratio > 1.0 {
            Some(
                SmartNotification::new(
                    NotificationKind::Error,
                    format!("{} budget exceeded", budget.category),
                    format!(
                        "This {} purchase brings {} to {} of its {} budget ({} over).",
                        format_currency(tx.amount),
                        budget.category,
                        format_currency(projected.spent),
                        format_currency(budget.limit),
                        format_currency(projected.spent - budget.limit)
                    ),
                    BUDGETS_CATEGORY,
                )
                .with_priority(Priority::High)
                .with_action("View budget", "/budgets"),
            )
        } else if ratio > self.insight_config.budget_warning_ratio {
            Some(
                SmartNotification::new(
                    NotificationKind::Warning,
                    format!("Approaching {} budget", budget.category),
                    format!(
                        "You've used {:.0}% of your {} budget.",
                        ratio * 100.0,
                        budget.category
                    ),
                    BUDGETS_CATEGORY,
                )
                .with_priority(Priority::Medium)
                .with_action("View budget", "/budgets"),
            )
        } else {
            None
        }
    }

    /// End-of-day roll-up; never more than `max_daily_notifications`
    pub fn daily_summary(
        &self,
        store: &NotificationStore,
        day: NaiveDate,
        transactions: &[Transaction],
        accounts: &[AccountBalance],
        budgets: Option<&[Budget]>,
    ) -> Vec<SmartNotification> {
        let mut notifications = Vec::new();

        let todays: Vec<&Transaction> = usable_expenses(transactions)
            .filter(|t| t.date == day)
            .collect();
        if !todays.is_empty() {
            let total: f64 = todays.iter().map(|t| t.amount).sum();
            let noun = if todays.len() == 1 { "transaction" } else { "transactions" };
            notifications.push(
                SmartNotification::new(
                    NotificationKind::Info,
                    "Daily spending summary",
                    format!(
                        "You spent {} across {} {} on {}.",
                        format_currency(total),
                        todays.len(),
                        noun,
                        day.format("%b %-d")
                    ),
                    DAILY_CATEGORY,
                )
                .with_priority(Priority::Low),
            );
        }

        let threshold = self.config.low_balance_threshold;
        let low: Vec<&AccountBalance> = accounts
            .iter()
            .filter(|a| a.balance.is_finite() && a.balance < threshold)
            .collect();
        if let Some(first) = low.first() {
            let message = if low.len() == 1 {
                format!("{} is down to {}.", first.name, format_currency(first.balance))
            } else {
                let names: Vec<&str> = low.iter().map(|a| a.name.as_str()).collect();
                format!(
                    "{} accounts are below {}: {}.",
                    low.len(),
                    format_currency(threshold),
                    names.join(", ")
                )
            };
            notifications.push(
                SmartNotification::new(
                    NotificationKind::Warning,
                    "Low balance",
                    message,
                    DAILY_CATEGORY,
                )
                .with_priority(Priority::High)
                .with_action("View accounts", "/accounts"),
            );
        }

        let ratio = self.insight_config.budget_warning_ratio;
        let pressured: Vec<&Budget> = budgets
            .unwrap_or_default()
            .iter()
            .filter(|b| b.utilization().is_some_and(|u| u > ratio))
            .collect();
        if !pressured.is_empty() {
            let names: Vec<&str> = pressured.iter().map(|b| b.category.as_str()).collect();
            let noun = if pressured.len() == 1 { "budget is" } else { "budgets are" };
            notifications.push(
                SmartNotification::new(
                    NotificationKind::Warning,
                    "Budget check-in",
                    format!(
                        "{} {} above {:.0}% of the limit: {}.",
                        pressured.len(),
                        noun,
                        ratio * 100.0,
                        names.join(", ")
                    ),
                    DAILY_CATEGORY,
                )
                .with_priority(Priority::Medium)
                .with_action("View budgets", "/budgets"),
            );
        }

        notifications.truncate(self.config.max_daily_notifications);
        self.publish(store, notifications, self.config.daily_ttl_hours)
    }

    /// Week-over-week comparison of expense totals
    pub fn weekly_insights(
        &self,
        store: &NotificationStore,
        current_week: &[Transaction],
        previous_week: &[Transaction],
    ) -> Vec<SmartNotification> {
        let mut notifications = Vec::new();

        let current: Vec<&Transaction> = usable_expenses(current_week).collect();
        let current_total: f64 = current.iter().map(|t| t.amount).sum();
        let previous_total: f64 = usable_expenses(previous_week).map(|t| t.amount).sum();

        if previous_total > 0.0 {
            let change = (current_total - previous_total) / previous_total * 100.0;
            let limit = self.config.weekly_change_percent;
            if change > limit {
                notifications.push(
                    SmartNotification::new(
                        NotificationKind::Warning,
                        "Spending up this week",
                        format!(
                            "You spent {} this week, {:.0}% more than last week ({}).",
                            format_currency(current_total),
                            change,
                            format_currency(previous_total)
                        ),
                        WEEKLY_CATEGORY,
                    )
                    .with_priority(Priority::Medium)
                    .with_action("View analytics", "/analytics"),
                );
            } else if change < -limit {
                notifications.push(
                    SmartNotification::new(
                        NotificationKind::Success,
                        "Spending down this week",
                        format!(
                            "You spent {} this week, {:.0}% less than last week ({}).",
                            format_currency(current_total),
                            -change,
                            format_currency(previous_total)
                        ),
                        WEEKLY_CATEGORY,
                    )
                    .with_priority(Priority::Medium),
                );
            }
        }

        let mut by_category: BTreeMap<&str, f64> = BTreeMap::new();
        for tx in &current {
            *by_category.entry(tx.category_label()).or_insert(0.0) += tx.amount;
        }
        // BTreeMap order makes the alphabetically first category win ties
        let top = by_category
            .into_iter()
            .fold(None, |best: Option<(&str, f64)>, (cat, total)| match best {
                Some((_, b)) if b >= total => best,
                _ => Some((cat, total)),
            });
        if let Some((category, total)) = top {
            notifications.push(
                SmartNotification::new(
                    NotificationKind::Info,
                    "Top category this week",
                    format!(
                        "{} led your spending this week at {}.",
                        category,
                        format_currency(total)
                    ),
                    WEEKLY_CATEGORY,
                )
                .with_priority(Priority::Low),
            );
        }

        self.publish(store, notifications, self.config.weekly_ttl_hours)
    }
}
