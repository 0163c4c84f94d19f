//! Infrastructure Layer
//!
//! Adapters implementing the ports defined in the application layer:
//!
//! - `broker/`: Broker API adapters (Kite Connect)
//! - `persistence/`: Batch and event storage
//! - `observers/`: Lifecycle event consumers

pub mod broker;
pub mod observers;
pub mod persistence;
