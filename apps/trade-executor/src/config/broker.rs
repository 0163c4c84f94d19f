//! Broker configuration for order routing.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::infrastructure::broker::kite::{DEFAULT_BASE_URL, KiteConfig, RetryConfig};

/// Kite Connect broker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// API key issued for the Kite Connect app.
    #[serde(default)]
    pub api_key: String,
    /// Base URL for API calls.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Exchange segment for orders and GTTs.
    #[serde(default = "default_exchange")]
    pub exchange: String,
    /// Product type for delivery orders.
    #[serde(default = "default_product")]
    pub product: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retry policy.
    #[serde(default)]
    pub retry: BrokerRetryConfig,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            exchange: default_exchange(),
            product: default_product(),
            timeout_secs: default_timeout_secs(),
            retry: BrokerRetryConfig::default(),
        }
    }
}

impl BrokerConfig {
    /// Build the adapter configuration.
    #[must_use]
    pub fn to_kite_config(&self) -> KiteConfig {
        KiteConfig::new(self.api_key.clone())
            .with_base_url(self.base_url.clone())
            .with_exchange(self.exchange.clone())
            .with_product(self.product.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_retry(self.retry.to_retry_config())
    }
}

/// Retry settings for broker HTTP calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerRetryConfig {
    /// Total attempts including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// First backoff delay in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Backoff cap in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Random jitter as a fraction of the delay.
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,
}

impl Default for BrokerRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            jitter_factor: default_jitter_factor(),
        }
    }
}

impl BrokerRetryConfig {
    fn to_retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_attempts,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            jitter_factor: self.jitter_factor,
            ..RetryConfig::default()
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_exchange() -> String {
    "NSE".to_string()
}

fn default_product() -> String {
    "CNC".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    200
}

const fn default_max_backoff_ms() -> u64 {
    5000
}

const fn default_jitter_factor() -> f64 {
    0.2
}
