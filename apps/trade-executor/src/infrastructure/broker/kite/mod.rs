//! Kite Connect (Zerodha) Broker Adapter
//!
//! Implementation of `BrokerGateway` for the Kite Connect v3 REST API with:
//! - Per-call session credentials taken from the `ExecutionContext`
//! - Retry with jittered exponential backoff (idempotent GETs only)
//! - Market-closed rejections surfaced as a distinct error
//! - Two-leg GTT triggers for contingent exits

mod adapter;
mod api_types;
mod config;
mod error;
mod http_client;

pub use adapter::KiteBrokerAdapter;
pub use config::{DEFAULT_BASE_URL, KiteConfig, RetryConfig};
pub use error::KiteError;
