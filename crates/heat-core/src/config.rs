//! heat.toml configuration parser.
//!
//! Every field has a default, so an empty `[heat]` table (or no file at
//! all) yields the stock counter settings.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_STORAGE_PREFIX: &str = "heat_";
pub const DEFAULT_MAX_TEMPERATURE: i64 = 100;
pub const DEFAULT_MIN_TEMPERATURE: i64 = 0;
pub const DEFAULT_SAFE_THRESHOLD: f64 = 0.6;
pub const DEFAULT_TTL_SECS: u64 = 300;

/// Counter settings shared by every counter a process creates.
///
/// Values are not validated: an inverted range or a threshold outside
/// `(0, 1]` is accepted and produces whatever the arithmetic gives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatConfig {
    pub storage_prefix: String,
    pub max_temperature: i64,
    pub min_temperature: i64,
    pub safe_threshold: f64,
    pub ttl_secs: u64,
}

impl Default for HeatConfig {
    fn default() -> Self {
        Self {
            storage_prefix: DEFAULT_STORAGE_PREFIX.to_string(),
            max_temperature: DEFAULT_MAX_TEMPERATURE,
            min_temperature: DEFAULT_MIN_TEMPERATURE,
            safe_threshold: DEFAULT_SAFE_THRESHOLD,
            ttl_secs: DEFAULT_TTL_SECS,
        }
    }
}

/// On-disk layout: settings live under a `[heat]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct HeatFile {
    #[serde(default)]
    heat: HeatConfig,
}

impl HeatConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let file: HeatFile = toml::from_str(content)?;
        Ok(file.heat)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        let file = HeatFile { heat: self.clone() };
        Ok(toml::to_string_pretty(&file)?)
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}
