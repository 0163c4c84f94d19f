//! Observability module for metrics.
//!
//! Lifecycle and batch counters go through the `metrics` facade; the
//! Prometheus exporter is optional and installed by the binary.

mod metrics;

pub use metrics::{
    MetricsConfig, MetricsError, init_metrics, record_batch_status, record_contingent_placement,
    record_fill_outcome, record_lifecycle_terminal, record_order_submission, record_poll_error,
};
