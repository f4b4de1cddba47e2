use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use common::{Error, Result};

/// Which trend confirmation the buy rule demands from the MA25 line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendFilter {
    /// MA25 is higher than on the previous bar.
    Rising,
    /// MA25 is rising and also above MA99.
    #[default]
    RisingAboveMa99,
}

/// Buy-rule parameters (TOML).
///
/// Example `config/rules.toml`:
/// ```toml
/// trend_filter = "rising"
/// min_history = 100
/// rsi_threshold = 50.0
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleConfig {
    pub trend_filter: TrendFilter,
    /// Fewer frames than this always classify as HOLD.
    pub min_history: usize,
    /// RSI strictly above this level confirms momentum.
    pub rsi_threshold: f64,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            trend_filter: TrendFilter::RisingAboveMa99,
            min_history: 100,
            rsi_threshold: 50.0,
        }
    }
}

impl RuleConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        let cfg: RuleConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("invalid rule config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from a TOML file, falling back to defaults when the file does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "No rule config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let cfg = Self::from_toml(&content)?;
        info!(path = %path.display(), trend_filter = ?cfg.trend_filter, "Loaded rule config");
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        // The rule compares the last two frames.
        if self.min_history < 2 {
            return Err(Error::Config(format!(
                "min_history must be at least 2, got {}",
                self.min_history
            )));
        }
        if !(0.0..=100.0).contains(&self.rsi_threshold) {
            return Err(Error::Config(format!(
                "rsi_threshold must be within 0..=100, got {}",
                self.rsi_threshold
            )));
        }
        Ok(())
    }
}
