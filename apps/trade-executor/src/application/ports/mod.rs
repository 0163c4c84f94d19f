//! Application Ports (Driven)
//!
//! Interfaces the application uses to reach external systems.

mod broker_port;
mod clock_port;
mod execution_observer_port;
mod execution_store_port;

pub use broker_port::{
    BrokerError, BrokerGateway, BrokerOrderStatus, ExecutionContext, OrderStatusReport,
    SessionCredential,
};
pub use clock_port::{ClockPort, FixedClock, SystemClock};
pub use execution_observer_port::{ExecutionObserver, NoOpObserver};
pub use execution_store_port::{BatchStatus, ExecutionStorePort, StoreError};
