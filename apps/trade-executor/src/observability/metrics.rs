//! Prometheus metrics for the trade executor.
//!
//! # Example
//!
//! ```ignore
//! use trade_executor::observability::{init_metrics, MetricsConfig};
//!
//! let config = MetricsConfig::from_addr_str("0.0.0.0:9100")?;
//! init_metrics(&config)?;
//! ```

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Configuration for the metrics exporter.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Address to bind the metrics HTTP listener.
    pub listen_addr: SocketAddr,
    /// Histogram buckets for fill wait durations (in seconds).
    pub fill_wait_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 9090)),
            // Fill waits from a single poll up to the default timeout
            fill_wait_buckets: vec![1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0],
        }
    }
}

impl MetricsConfig {
    /// Create a new metrics configuration with custom address.
    #[must_use]
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            listen_addr: addr,
            ..Default::default()
        }
    }

    /// Parse the listen address from configuration text.
    pub fn from_addr_str(addr: &str) -> Result<Self, MetricsError> {
        addr.parse()
            .map(Self::with_addr)
            .map_err(|e| MetricsError::Configuration(format!("invalid listen address '{addr}': {e}")))
    }
}

/// Initialize the Prometheus metrics exporter.
///
/// This starts an HTTP server that exposes metrics at `/metrics`.
///
/// # Errors
///
/// Returns an error if the metrics exporter fails to start (e.g., port already in use).
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(config.listen_addr)
        .set_buckets(&config.fill_wait_buckets)
        .map_err(|e| MetricsError::Configuration(e.to_string()))?
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(
        addr = %config.listen_addr,
        "Prometheus metrics exporter started"
    );

    Ok(())
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to configure metrics exporter.
    #[error("metrics configuration error: {0}")]
    Configuration(String),
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

// ============================================================================
// Lifecycle Metrics
// ============================================================================

/// Record a market buy submission.
///
/// * `outcome` - "accepted", "market_closed" or "rejected"
pub fn record_order_submission(outcome: &str) {
    counter!("order_submissions_total", "outcome" => outcome.to_string()).increment(1);
}

/// Record how a fill wait ended and how long it took.
///
/// * `outcome` - "filled", "rejected" or "timeout"
pub fn record_fill_outcome(outcome: &str, wait_seconds: f64) {
    counter!("fill_outcomes_total", "outcome" => outcome.to_string()).increment(1);
    histogram!("fill_wait_seconds", "outcome" => outcome.to_string()).record(wait_seconds);
}

/// Record a contingent (GTT) placement attempt.
pub fn record_contingent_placement(outcome: &str) {
    counter!("contingent_placements_total", "outcome" => outcome.to_string()).increment(1);
}

/// Record the terminal phase of a lifecycle.
pub fn record_lifecycle_terminal(phase: &str) {
    counter!("lifecycle_terminal_total", "phase" => phase.to_string()).increment(1);
}

/// Record a swallowed order status poll error.
pub fn record_poll_error() {
    counter!("order_status_poll_errors_total").increment(1);
}

// ============================================================================
// Batch Metrics
// ============================================================================

/// Record the final status of an executed batch.
pub fn record_batch_status(status: &str) {
    counter!("batches_total", "status" => status.to_string()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MetricsConfig::default();
        assert_eq!(config.listen_addr.port(), 9090);
        assert!(config.fill_wait_buckets.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_config_from_addr_str() {
        let config = MetricsConfig::from_addr_str("127.0.0.1:9100").unwrap();
        assert_eq!(config.listen_addr.port(), 9100);

        assert!(matches!(
            MetricsConfig::from_addr_str("not-an-address"),
            Err(MetricsError::Configuration(_))
        ));
    }

    #[test]
    fn test_record_without_exporter_is_noop() {
        // No recorder installed; the facade discards everything.
        record_order_submission("accepted");
        record_fill_outcome("filled", 2.0);
        record_contingent_placement("placed");
        record_lifecycle_terminal("COMPLETED");
        record_poll_error();
        record_batch_status("COMPLETED");
    }
}
