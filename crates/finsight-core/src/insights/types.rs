//! Core types for the Insight Generator

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of advisory message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Warning,
    Info,
    Success,
    Tip,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::Warning => "warning",
            InsightKind::Info => "info",
            InsightKind::Success => "success",
            InsightKind::Tip => "tip",
        }
    }
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InsightKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warning" => Ok(InsightKind::Warning),
            "info" => Ok(InsightKind::Info),
            "success" => Ok(InsightKind::Success),
            "tip" => Ok(InsightKind::Tip),
            _ => Err(format!("Unknown insight kind: {}", s)),
        }
    }
}

/// An advisory observation about spending behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingInsight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub message: String,
    /// Heuristic score in [0, 1]
    pub confidence: f64,
    pub actionable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
}

impl SpendingInsight {
    /// Create a non-actionable insight
    pub fn new(
        kind: InsightKind,
        title: impl Into<String>,
        message: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            confidence: confidence.clamp(0.0, 1.0),
            actionable: false,
            action_text: None,
            action_url: None,
        }
    }

    /// Attach a suggested action; marks the insight actionable
    pub fn with_action(mut self, text: impl Into<String>, url: impl Into<String>) -> Self {
        self.actionable = true;
        self.action_text = Some(text.into());
        self.action_url = Some(url.into());
        self
    }
}
