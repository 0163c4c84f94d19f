//! Application Use Cases

mod batch_execution;
mod trade_lifecycle;

pub use batch_execution::{BatchError, BatchExecutionUseCase, BatchSettings};
pub use trade_lifecycle::{LifecycleSettings, TradeLifecycleOrchestrator};
