//! Power core settings, read from a JSON file by the host at startup.

use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{
    is_valid_key, DEFAULT_NAMESPACE, MILLIS_PER_TICK, PERMISSION_CACHE_CAPACITY, TICKS_PER_SECOND,
};
use crate::cooldown::SystemClock;
use crate::logging::TracingConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerCoreConfig {
    pub ticks_per_second: u64,
    pub millis_per_tick: u64,
    /// Namespace for resource keys written without one
    pub default_namespace: String,
    pub permission_cache_capacity: usize,
    pub tracing: TracingConfig,
}

impl Default for PowerCoreConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: TICKS_PER_SECOND,
            millis_per_tick: MILLIS_PER_TICK,
            default_namespace: DEFAULT_NAMESPACE.to_string(),
            permission_cache_capacity: PERMISSION_CACHE_CAPACITY,
            tracing: TracingConfig::default(),
        }
    }
}

impl PowerCoreConfig {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn from_json(json: &str) -> Option<Self> {
        serde_json::from_str(json).ok()
    }

    /// Wall clock ticking every `millis_per_tick`
    pub fn system_clock(&self) -> SystemClock {
        SystemClock::new(self.millis_per_tick)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.ticks_per_second > 0, "ticks_per_second must be positive");
        ensure!(self.millis_per_tick > 0, "millis_per_tick must be positive");
        ensure!(
            is_valid_key(&self.default_namespace),
            "default_namespace '{}' is not a valid namespace",
            self.default_namespace
        );
        ensure!(
            self.permission_cache_capacity > 0,
            "permission_cache_capacity must be positive"
        );
        Ok(())
    }

    /// Read and validate a config file; missing fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading power core config {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("parsing power core config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }
}
