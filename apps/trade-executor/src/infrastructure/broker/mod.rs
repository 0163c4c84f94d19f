//! Broker Adapters
//!
//! Implementations of `BrokerGateway` for various brokers.

pub mod kite;

pub use kite::{KiteBrokerAdapter, KiteConfig, KiteError};
