use std::time::Duration;

use serde::Deserialize;

use linkvault_engine::SweeperConfig;

/// Expiry sweeper configuration.
#[derive(Debug, Deserialize)]
pub struct SweeperServerConfig {
    /// Whether the sweeper runs at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Seconds between sweeps (default: 3600).
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,
    /// Sweep once at startup instead of waiting a full interval.
    #[serde(default = "default_sweep_on_start")]
    pub sweep_on_start: bool,
}

impl SweeperServerConfig {
    /// Convert to the engine's sweeper settings.
    pub fn to_sweeper_config(&self) -> SweeperConfig {
        SweeperConfig {
            interval: Duration::from_secs(self.interval_seconds.max(1)),
            sweep_on_start: self.sweep_on_start,
        }
    }
}

impl Default for SweeperServerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval_seconds: default_interval_seconds(),
            sweep_on_start: default_sweep_on_start(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_interval_seconds() -> u64 {
    3600
}

fn default_sweep_on_start() -> bool {
    true
}
