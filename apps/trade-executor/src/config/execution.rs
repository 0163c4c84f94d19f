//! Lifecycle and batch execution settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::use_cases::LifecycleSettings;

/// Execution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Order status poll interval in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Fill wait budget in seconds.
    #[serde(default = "default_fill_timeout_secs")]
    pub fill_timeout_secs: u64,
    /// Plans driven at once within a batch.
    #[serde(default = "default_max_concurrent_plans")]
    pub max_concurrent_plans: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            fill_timeout_secs: default_fill_timeout_secs(),
            max_concurrent_plans: default_max_concurrent_plans(),
        }
    }
}

impl ExecutionConfig {
    /// Lifecycle timing settings.
    #[must_use]
    pub const fn lifecycle_settings(&self) -> LifecycleSettings {
        LifecycleSettings {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            fill_timeout: Duration::from_secs(self.fill_timeout_secs),
        }
    }
}

const fn default_poll_interval_ms() -> u64 {
    2000
}

const fn default_fill_timeout_secs() -> u64 {
    300
}

const fn default_max_concurrent_plans() -> usize {
    1
}
