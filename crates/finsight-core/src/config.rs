//! Pipeline configuration
//!
//! Thresholds for every component, loaded from TOML with a two-layer
//! resolution:
//! 1. An explicit override path, or the override in the data dir
//!    (~/.local/share/finsight/config/pipeline.toml)
//! 2. Embedded defaults (compiled into the binary)
//!
//! Keys missing from an override keep their default value.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::classifier::ClassifierConfig;
use crate::duplicates::DuplicateConfig;
use crate::error::{Error, Result};
use crate::insights::InsightConfig;
use crate::notifications::NotificationConfig;
use crate::patterns::PatternConfig;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/pipeline.toml");

/// Configuration for the whole pipeline
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub classifier: ClassifierConfig,
    pub duplicates: DuplicateConfig,
    pub patterns: PatternConfig,
    pub insights: InsightConfig,
    pub notifications: NotificationConfig,
}

impl PipelineConfig {
    /// Load configuration (override first, then embedded default)
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = override_path {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Self::from_file(path);
        }

        if let Some(default_path) = default_config_path() {
            if default_path.exists() {
                return Self::from_file(&default_path);
            }
        }

        Self::embedded()
    }

    /// Parse the compiled-in defaults
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(DEFAULT_CONFIG)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        debug!("Loaded pipeline config from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Parse config from TOML content
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let d = &self.duplicates;
        if d.name_weight < 0.0 || d.amount_weight < 0.0 || d.date_weight < 0.0 {
            return Err(Error::Config("duplicate weights must be non-negative".into()));
        }
        if !(0.0..=1.0).contains(&d.threshold) {
            return Err(Error::Config("duplicate threshold must be within [0, 1]".into()));
        }
        if self.notifications.cleanup_interval_secs == 0 {
            return Err(Error::Config("cleanup_interval_secs must be positive".into()));
        }
        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("finsight").join("config").join("pipeline.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_embedded_matches_defaults() {
        let embedded = PipelineConfig::embedded().unwrap();
        assert_eq!(embedded, PipelineConfig::default());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [insights]
            large_transaction_threshold = 500.0
            "#,
        )
        .unwrap();

        assert_eq!(config.insights.large_transaction_threshold, 500.0);
        assert_eq!(config.insights.frequency_threshold, 2.0);
        assert_eq!(config.duplicates, DuplicateConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(PipelineConfig::from_toml_str("[duplicates]\nthreshold = 1.5").is_err());
        assert!(
            PipelineConfig::from_toml_str("[notifications]\ncleanup_interval_secs = 0").is_err()
        );
        assert!(PipelineConfig::from_toml_str("not toml at all [").is_err());
    }

    #[test]
    fn test_load_from_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[patterns]\ntrend_threshold = 0.25").unwrap();

        let config = PipelineConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.patterns.trend_threshold, 0.25);
    }

    #[test]
    fn test_load_missing_override_is_error() {
        let result = PipelineConfig::load(Some(Path::new("/nonexistent/pipeline.toml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_from_file_read_failure_is_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = PipelineConfig::from_file(&dir.path().join("missing.toml"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
