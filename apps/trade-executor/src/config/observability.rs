//! Observability configuration for logging and metrics.

use serde::{Deserialize, Serialize};

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Default log level for the crate.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit JSON log lines.
    #[serde(default)]
    pub json_logs: bool,
    /// Prometheus listen address; metrics are off when unset.
    #[serde(default)]
    pub metrics_addr: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            metrics_addr: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
