//! Kite adapter configuration.

use std::time::Duration;

/// Production Kite Connect endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.kite.trade";

/// Configuration for the Kite broker adapter.
#[derive(Debug, Clone)]
pub struct KiteConfig {
    /// App API key. The per-session access token is not configuration.
    pub api_key: String,
    /// API base URL.
    pub base_url: String,
    /// Exchange orders are routed to.
    pub exchange: String,
    /// Product type for entries and exits.
    pub product: String,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Retry policy configuration.
    pub retry: RetryConfig,
}

impl KiteConfig {
    /// Create a new configuration for NSE delivery trades.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            exchange: "NSE".to_string(),
            product: "CNC".to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
        }
    }

    /// Override the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the exchange.
    #[must_use]
    pub fn with_exchange(mut self, exchange: impl Into<String>) -> Self {
        self.exchange = exchange.into();
        self
    }

    /// Set the product type.
    #[must_use]
    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = product.into();
        self
    }

    /// Set the HTTP timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry configuration.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

/// Retry configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts including the first.
    pub max_attempts: u32,
    /// Initial backoff duration.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// Backoff multiplier.
    pub multiplier: f64,
    /// Jitter as a fraction of the backoff (0.2 = +/-20%).
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
            multiplier: 2.0,
            jitter_factor: 0.2,
        }
    }
}
