//! Notification value types

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::insights::SpendingInsight;

/// Process-wide sequence that keeps generated ids unique within a millisecond
static NEXT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn generate_id(now: DateTime<Utc>) -> String {
    let seq = NEXT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("ntf-{}-{}", now.timestamp_millis(), seq)
}

/// Visual severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Warning,
    Error,
    Info,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
            NotificationKind::Info => "info",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Priority for an insight of the given confidence
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.9 {
            Priority::High
        } else if confidence >= 0.7 {
            Priority::Medium
        } else {
            Priority::Low
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user-dismissible notification held by a [`NotificationStore`]
///
/// [`NotificationStore`]: super::NotificationStore
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartNotification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Only ever goes from false to true
    pub read: bool,
    pub priority: Priority,
    pub category: String,
    pub actionable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl SmartNotification {
    /// Create an unread, medium-priority notification stamped with the
    /// current time and a fresh id
    pub fn new(
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(now),
            kind,
            title: title.into(),
            message: message.into(),
            timestamp: now,
            read: false,
            priority: Priority::Medium,
            category: category.into(),
            actionable: false,
            action_text: None,
            action_url: None,
            expires_at: None,
        }
    }

    /// Wrap an insight; its action (if any) carries over
    pub fn from_insight(insight: &SpendingInsight, kind: NotificationKind, category: &str) -> Self {
        let mut notification = Self::new(kind, &insight.title, &insight.message, category)
            .with_priority(Priority::from_confidence(insight.confidence));
        if let (Some(text), Some(url)) = (&insight.action_text, &insight.action_url) {
            notification = notification.with_action(text, url);
        }
        notification
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_action(mut self, text: impl Into<String>, url: impl Into<String>) -> Self {
        self.actionable = true;
        self.action_text = Some(text.into());
        self.action_url = Some(url.into());
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Expire `ttl` after the notification's timestamp. A TTL that
    /// overflows the calendar leaves the notification without an expiry.
    pub fn with_ttl(self, ttl: Duration) -> Self {
        match self.timestamp.checked_add_signed(ttl) {
            Some(expires_at) => self.with_expiry(expires_at),
            None => self,
        }
    }

    /// True once `now` is strictly past the expiry
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| now > expires)
    }
}
