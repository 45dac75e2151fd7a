//! Smart notifications
//!
//! The [`NotificationStore`] is the one stateful piece of the pipeline: an
//! explicitly constructed, shareable collection of notifications with
//! read/unread state and time-based expiry. The [`NotificationGenerator`]
//! turns insights and transaction events into notifications and appends
//! them to a store.

mod cleanup;
mod generators;
mod store;
mod types;

use serde::{Deserialize, Serialize};

pub use cleanup::CleanupHandle;
pub use generators::NotificationGenerator;
pub use store::NotificationStore;
pub use types::{NotificationKind, Priority, SmartNotification};

/// Notification lifecycle and generator thresholds.
///
/// TTLs are in hours; 0 means the notification never expires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Seconds between expiry sweeps
    pub cleanup_interval_secs: u64,
    pub insight_ttl_hours: u64,
    pub transaction_ttl_hours: u64,
    pub daily_ttl_hours: u64,
    pub weekly_ttl_hours: u64,
    /// Accounts below this balance trigger a daily warning
    pub low_balance_threshold: f64,
    /// Week-over-week change (percent) that earns a weekly notification
    pub weekly_change_percent: f64,
    /// Upper bound on notifications from one daily summary
    pub max_daily_notifications: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            cleanup_interval_secs: 60,
            insight_ttl_hours: 168,
            transaction_ttl_hours: 72,
            daily_ttl_hours: 24,
            weekly_ttl_hours: 168,
            low_balance_threshold: 100.0,
            weekly_change_percent: 20.0,
            max_daily_notifications: 3,
        }
    }
}

impl NotificationConfig {
    pub fn cleanup_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.cleanup_interval_secs)
    }
}
