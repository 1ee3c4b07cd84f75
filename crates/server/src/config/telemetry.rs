use serde::Deserialize;

/// Log output configuration.
#[derive(Debug, Deserialize)]
pub struct TelemetryConfig {
    /// Filter directive used when `RUST_LOG` is not set (e.g.
    /// `"info,linkvault_engine=debug"`).
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Whether to emit ANSI colour codes.
    #[serde(default = "default_ansi")]
    pub ansi: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            ansi: default_ansi(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_owned()
}

fn default_ansi() -> bool {
    true
}
