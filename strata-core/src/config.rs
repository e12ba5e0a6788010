use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};

/// Top-level Strata configuration, matching `.strata/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrataConfig {
    #[serde(default)]
    pub scan: ScanSection,
    #[serde(default)]
    pub plan: PlanSection,
    #[serde(default)]
    pub vcs: VcsSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSection {
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            include_patterns: vec![
                "**/*.rs".into(),
                "**/*.py".into(),
                "**/*.pyi".into(),
                "**/*.ts".into(),
                "**/*.tsx".into(),
                "**/*.js".into(),
                "**/*.jsx".into(),
                "**/*.mjs".into(),
                "**/*.cjs".into(),
                "**/*.c".into(),
                "**/*.h".into(),
                "**/*.cc".into(),
                "**/*.cpp".into(),
                "**/*.cxx".into(),
                "**/*.hh".into(),
                "**/*.hpp".into(),
            ],
            exclude_patterns: vec![
                "**/node_modules/**".into(),
                "**/vendor/**".into(),
                "**/target/**".into(),
                "**/.git/**".into(),
                "**/dist/**".into(),
                "**/__pycache__/**".into(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSection {
    /// Maximum number of files per batch.
    pub batch_size: usize,
    /// Fraction of the tree that must be impacted before an incremental
    /// run is abandoned in favor of a full re-analysis.
    pub full_reanalysis_threshold: f64,
}

impl Default for PlanSection {
    fn default() -> Self {
        Self {
            batch_size: 3,
            full_reanalysis_threshold: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VcsSection {
    /// Timeout for a single git invocation, in seconds.
    pub diff_timeout_secs: u64,
}

impl Default for VcsSection {
    fn default() -> Self {
        Self {
            diff_timeout_secs: 30,
        }
    }
}

impl StrataConfig {
    /// Loads configuration from `<root>/.strata/config.toml`, falling
    /// back to defaults when the file does not exist.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(".strata").join("config.toml");
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path)?;
        let config: Self =
            toml::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.plan.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.plan.full_reanalysis_threshold) {
            return Err(ConfigError::Invalid(
                "full_reanalysis_threshold must be within [0, 1]".into(),
            ));
        }
        Ok(())
    }
}
