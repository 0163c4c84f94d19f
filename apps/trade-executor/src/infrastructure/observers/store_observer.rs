//! Observer that persists events and fans them out to live subscribers.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::application::ports::{ExecutionObserver, ExecutionStorePort};
use crate::domain::trade_lifecycle::ExecutionEvent;

/// Default capacity of the live broadcast channel.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Appends every event to the store, then rebroadcasts it.
///
/// Store failures are logged and swallowed; a slow subscriber only lags
/// itself.
pub struct StoreObserver<S: ExecutionStorePort> {
    store: Arc<S>,
    sender: broadcast::Sender<ExecutionEvent>,
}

impl<S: ExecutionStorePort> StoreObserver<S> {
    /// Create an observer over `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_capacity(store, DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create an observer with a custom broadcast capacity.
    pub fn with_capacity(store: Arc<S>, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { store, sender }
    }

    /// Subscribe to live events.
    pub fn subscribe(&self) -> broadcast::Receiver<ExecutionEvent> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl<S: ExecutionStorePort> ExecutionObserver for StoreObserver<S> {
    async fn on_event(&self, event: ExecutionEvent) {
        if let Err(e) = self.store.append_event(&event).await {
            tracing::error!(
                correlation_id = %event.correlation_id,
                symbol = %event.symbol,
                phase = %event.phase,
                error = %e,
                "Failed to persist execution event"
            );
        }

        // No subscribers is not an error.
        let _ = self.sender.send(event);
    }
}
