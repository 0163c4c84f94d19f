//! Execution Observer Port (Driven Port)
//!
//! Receives lifecycle events in emission order. Observers are
//! fire-and-forget: they must not fail, and the orchestrator never retries
//! or blocks on them beyond awaiting the call.

use async_trait::async_trait;

use crate::domain::trade_lifecycle::ExecutionEvent;

/// Port for consuming lifecycle events.
#[async_trait]
pub trait ExecutionObserver: Send + Sync {
    /// Handle one event. Implementations swallow and log their own errors.
    async fn on_event(&self, event: ExecutionEvent);
}

/// Observer that discards every event.
#[derive(Debug, Clone, Default)]
pub struct NoOpObserver;

#[async_trait]
impl ExecutionObserver for NoOpObserver {
    async fn on_event(&self, _event: ExecutionEvent) {}
}
