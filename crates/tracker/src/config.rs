use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn default_ticks_per_row() -> u16 {
    6
}

fn default_max_patterns() -> usize {
    32
}

fn default_max_orders_user() -> usize {
    64
}

/// Persisted engine knobs (spec.md §6 "Edit constants"), mirroring the
/// teacher's `#[serde(default)]` config pattern so a partial TOML file
/// loads cleanly. The engine itself never touches `toml` directly; this
/// is the ambient plumbing around it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_ticks_per_row")]
    pub ticks_per_row: u16,
    #[serde(default = "default_max_patterns")]
    pub max_patterns: usize,
    #[serde(default = "default_max_orders_user")]
    pub max_orders_user: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            ticks_per_row: default_ticks_per_row(),
            max_patterns: default_max_patterns(),
            max_orders_user: default_max_orders_user(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<EngineConfig, ConfigError> {
        let config: EngineConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Boundary validation (spec.md §7): the per-frame engine path never
    /// rejects input, but a malformed config file would otherwise corrupt
    /// the sequencer's tick-counter arithmetic before the first frame runs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ticks_per_row == 0 {
            return Err(ConfigError::InvalidTicksPerRow(self.ticks_per_row));
        }
        if self.max_patterns < 16 {
            return Err(ConfigError::InvalidMaxPatterns(self.max_patterns));
        }
        if self.max_orders_user == 0 {
            return Err(ConfigError::InvalidMaxOrdersUser(self.max_orders_user));
        }
        Ok(())
    }
}
