//! Allocator configuration
//!
//! Channel table (economics + spend fractions), total budget and sweep range.
//! Loaded from TOML and passed explicitly into every run.

use crate::allocation::{BudgetSweep, ChannelConfig};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "ALLOCATOR_CONFIG_PATH";
/// Config file used when the environment variable is unset.
pub const DEFAULT_CONFIG_PATH: &str = "allocator.toml";

/// Top-level allocator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocatorConfig {
    /// Total acquisition budget for a single run
    #[serde(default = "default_total_budget")]
    pub total_budget: f64,

    /// Budget range for `sweep`
    #[serde(default)]
    pub sweep: BudgetSweep,

    /// Per-channel economics and spend fractions
    #[serde(default = "default_channels")]
    pub channels: Vec<ChannelConfig>,
}

fn default_total_budget() -> f64 {
    500_000.0
}

/// Spend-fraction table of the growth dashboard. Economics are sample values
/// and are expected to be replaced by the LTV pipeline's output.
fn default_channels() -> Vec<ChannelConfig> {
    vec![
        ChannelConfig::new("paid_search", 42.0, 14.0, 0.04, 0.40),
        ChannelConfig::new("social_ads", 21.0, 9.0, 0.02, 0.30),
        ChannelConfig::new("affiliate", 30.0, 8.0, 0.01, 0.20),
        ChannelConfig::new("referral", 95.0, 12.0, 0.01, 0.16),
        ChannelConfig::new("organic", 25.0, 2.0, 0.00, 0.10),
    ]
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            total_budget: default_total_budget(),
            sweep: BudgetSweep::default(),
            channels: default_channels(),
        }
    }
}

impl AllocatorConfig {
    /// Load from TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        Ok(config)
    }

    /// Load from `ALLOCATOR_CONFIG_PATH` or the default path. Falls back to
    /// the built-in defaults only when that file does not exist.
    pub fn from_env() -> anyhow::Result<Self> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_or_default(path)
    }

    /// Load from `path`, or return the defaults if the file is missing.
    /// Read and parse errors are returned.
    pub fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) if is_not_found(&e) => {
                tracing::info!(
                    "No allocator config at {}, using built-in defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Save to TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn channel(&self, name: &str) -> Option<&ChannelConfig> {
        self.channels.iter().find(|c| c.channel == name)
    }
}

fn is_not_found(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<std::io::Error>()
            .map_or(false, |io| io.kind() == std::io::ErrorKind::NotFound)
    })
}
