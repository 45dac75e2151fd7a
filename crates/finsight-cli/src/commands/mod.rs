//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `input` - Transaction, budget and account snapshot loading (JSON/CSV)
//! - `classify` - Category suggestions and learned corrections
//! - `analysis` - Duplicates, spending patterns and insights
//! - `notify` - Daily and weekly notification roll-ups

pub mod analysis;
pub mod classify;
pub mod input;
pub mod notify;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use serde::Serialize;
use tracing::debug;

use finsight_core::{CategoryClassifier, PipelineConfig, SmartNotification};

// Re-export command functions for main.rs
pub use analysis::*;
pub use classify::*;
pub use notify::*;

/// Settings shared by every command
pub struct Context {
    pub config: PipelineConfig,
    /// Where learned category associations are kept, if a location is known
    pub learned_path: Option<PathBuf>,
    pub json: bool,
}

impl Context {
    pub fn load(
        config_path: Option<&Path>,
        learned_path: Option<PathBuf>,
        json: bool,
    ) -> Result<Self> {
        let config = PipelineConfig::load(config_path).context("Failed to load pipeline config")?;
        Ok(Self {
            config,
            learned_path: learned_path.or_else(default_learned_path),
            json,
        })
    }

    /// Classifier with any saved learned associations applied
    pub fn classifier(&self) -> Result<CategoryClassifier> {
        let mut classifier = CategoryClassifier::with_config(self.config.classifier.clone());

        if let Some(path) = self.learned_path.as_deref().filter(|p| p.exists()) {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let count = classifier
                .import_learned(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            debug!(count, file = %path.display(), "Learned associations loaded");
        }

        Ok(classifier)
    }

    pub fn save_learned(&self, classifier: &CategoryClassifier) -> Result<PathBuf> {
        let path = self.learned_path.clone().context(
            "Could not determine a data directory; pass --learned to choose a file",
        )?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, classifier.export_learned()?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

/// Default learned associations file (~/.local/share/finsight/learned.json)
pub fn default_learned_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("finsight").join("learned.json"))
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Human-readable notification list
pub fn print_notifications(notifications: &[SmartNotification]) {
    if notifications.is_empty() {
        println!("   Nothing to report.");
        return;
    }
    for n in notifications {
        let icon = match n.kind {
            finsight_core::NotificationKind::Success => "✅",
            finsight_core::NotificationKind::Warning => "⚠️ ",
            finsight_core::NotificationKind::Error => "🚨",
            finsight_core::NotificationKind::Info => "💡",
        };
        println!("   {} [{}] {}", icon, n.priority, n.title);
        println!("      {}", n.message);
    }
}
