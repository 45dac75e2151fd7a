//! Finsight Core Library
//!
//! Transaction intelligence for the Finsight personal finance app:
//! - Category classification with learned user corrections
//! - Duplicate transaction detection
//! - Spending pattern, trend and outlier analysis
//! - Ranked spending insights (optionally budget-aware)
//! - A stateful notification store with read state and expiry
//!
//! Analysis functions are pure: they take transaction snapshots and return
//! values, degrading to empty results on bad input. Only the notification
//! store holds state.

pub mod classifier;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod insights;
pub mod models;
pub mod notifications;
pub mod patterns;
pub mod pipeline;

pub use classifier::{CategoryClassifier, CategorySuggestion, ClassifierConfig, SuggestionSource};
pub use config::PipelineConfig;
pub use duplicates::{
    DuplicateConfig, DuplicateDetectionResult, DuplicateDetector, PotentialDuplicate,
};
pub use error::{Error, Result};
pub use insights::{InsightConfig, InsightGenerator, InsightKind, InsightRule, SpendingInsight};
pub use models::{AccountBalance, Budget, Candidate, Transaction, TransactionType};
pub use notifications::{
    CleanupHandle, NotificationConfig, NotificationGenerator, NotificationKind, NotificationStore,
    Priority, SmartNotification,
};
pub use patterns::{OutlierReport, PatternConfig, SpendingAnalyzer, SpendingPattern, Trend};
pub use pipeline::{InsightReport, TransactionPipeline, TransactionReport};
