//! Transaction pipeline
//!
//! Wires every component from a single [`PipelineConfig`] and owns the
//! notification store they feed. Hosts that only need one component can
//! construct it directly instead.

use serde::Serialize;
use tracing::info;

use crate::classifier::{CategoryClassifier, CategorySuggestion};
use crate::config::PipelineConfig;
use crate::duplicates::{DuplicateDetectionResult, DuplicateDetector};
use crate::error::Result;
use crate::insights::{InsightGenerator, SpendingInsight};
use crate::models::{Budget, Transaction};
use crate::notifications::{
    CleanupHandle, NotificationGenerator, NotificationStore, SmartNotification,
};
use crate::patterns::{SpendingAnalyzer, SpendingPattern};

/// What the pipeline learned about one incoming transaction
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReport {
    pub transaction_id: String,
    /// Best category guess, when the classifier is confident
    pub suggestion: Option<CategorySuggestion>,
    pub duplicate: DuplicateDetectionResult,
    /// Notifications added to the store for this transaction
    pub notifications: Vec<SmartNotification>,
}

/// Result of re-analyzing a transaction snapshot
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightReport {
    pub patterns: Vec<SpendingPattern>,
    pub insights: Vec<SpendingInsight>,
    pub notifications: Vec<SmartNotification>,
}

pub struct TransactionPipeline {
    config: PipelineConfig,
    classifier: CategoryClassifier,
    detector: DuplicateDetector,
    analyzer: SpendingAnalyzer,
    insights: InsightGenerator,
    notifier: NotificationGenerator,
    store: NotificationStore,
}

impl Default for TransactionPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionPipeline {
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    pub fn with_config(config: PipelineConfig) -> Self {
        Self::with_store(config, NotificationStore::new())
    }

    /// Build a pipeline that publishes into an existing store
    pub fn with_store(config: PipelineConfig, store: NotificationStore) -> Self {
        Self {
            classifier: CategoryClassifier::with_config(config.classifier.clone()),
            detector: DuplicateDetector::with_config(config.duplicates.clone()),
            analyzer: SpendingAnalyzer::with_config(config.patterns.clone()),
            insights: InsightGenerator::with_config(
                config.insights.clone(),
                config.patterns.clone(),
            ),
            notifier: NotificationGenerator::with_config(
                config.notifications.clone(),
                config.insights.clone(),
                DuplicateDetector::with_config(config.duplicates.clone()),
            ),
            store,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn classifier(&self) -> &CategoryClassifier {
        &self.classifier
    }

    /// Mutable access for `learn` and learned-association import
    pub fn classifier_mut(&mut self) -> &mut CategoryClassifier {
        &mut self.classifier
    }

    pub fn detector(&self) -> &DuplicateDetector {
        &self.detector
    }

    pub fn analyzer(&self) -> &SpendingAnalyzer {
        &self.analyzer
    }

    pub fn insight_generator(&self) -> &InsightGenerator {
        &self.insights
    }

    pub fn notifier(&self) -> &NotificationGenerator {
        &self.notifier
    }

    pub fn store(&self) -> &NotificationStore {
        &self.store
    }

    /// Categorize, duplicate-check and notify for one new transaction
    pub fn ingest(
        &self,
        tx: &Transaction,
        history: &[Transaction],
        budgets: Option<&[Budget]>,
    ) -> TransactionReport {
        let suggestion = self
            .classifier
            .categorize(&tx.as_candidate())
            .and_then(|category| {
                self.classifier
                    .suggest(&tx.as_candidate())
                    .into_iter()
                    .find(|s| s.category == category)
            });
        let duplicate = self.detector.detect(tx, history);
        let notifications =
            self.notifier
                .for_transaction(&self.store, tx, history, budgets, &self.classifier);

        TransactionReport {
            transaction_id: tx.id.clone(),
            suggestion,
            duplicate,
            notifications,
        }
    }

    /// Analyze a snapshot, generate insights and publish them as notifications
    pub fn refresh_insights(
        &self,
        transactions: &[Transaction],
        budgets: Option<&[Budget]>,
    ) -> InsightReport {
        let patterns = self.analyzer.analyze(transactions);
        let insights = self.insights.generate(transactions, budgets);
        let notifications = self.notifier.from_insights(&self.store, &insights);

        info!(
            patterns = patterns.len(),
            insights = insights.len(),
            notifications = notifications.len(),
            "Insights refreshed"
        );

        InsightReport {
            patterns,
            insights,
            notifications,
        }
    }

    /// Start the store's expiry sweep at the configured interval
    pub fn start_cleanup(&self) -> Result<CleanupHandle> {
        self.store
            .start_cleanup(self.config.notifications.cleanup_interval())
    }
}
