//! In-memory execution store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::dto::PreparedBatch;
use crate::application::ports::{BatchStatus, ExecutionStorePort, StoreError};
use crate::domain::shared::CorrelationId;
use crate::domain::trade_lifecycle::ExecutionEvent;

/// In-memory implementation of `ExecutionStorePort`.
///
/// Suitable for a single process run and for tests. Nothing survives a
/// restart.
#[derive(Debug, Default)]
pub struct InMemoryExecutionStore {
    batches: RwLock<HashMap<CorrelationId, PreparedBatch>>,
    events: RwLock<HashMap<CorrelationId, Vec<ExecutionEvent>>>,
}

impl InMemoryExecutionStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored batches.
    pub async fn batch_count(&self) -> usize {
        self.batches.read().await.len()
    }

    /// Number of events logged for a correlation id.
    pub async fn event_count(&self, correlation_id: &CorrelationId) -> usize {
        self.events
            .read()
            .await
            .get(correlation_id)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl ExecutionStorePort for InMemoryExecutionStore {
    async fn save_batch(&self, batch: &PreparedBatch) -> Result<(), StoreError> {
        self.batches
            .write()
            .await
            .insert(batch.batch_id.clone(), batch.clone());
        Ok(())
    }

    async fn load_batch(&self, batch_id: &CorrelationId) -> Result<Option<PreparedBatch>, StoreError> {
        Ok(self.batches.read().await.get(batch_id).cloned())
    }

    async fn set_batch_status(
        &self,
        batch_id: &CorrelationId,
        status: BatchStatus,
    ) -> Result<(), StoreError> {
        let mut batches = self.batches.write().await;
        let batch = batches
            .get_mut(batch_id)
            .ok_or_else(|| StoreError::BatchNotFound(batch_id.clone()))?;
        batch.status = status;
        Ok(())
    }

    async fn append_event(&self, event: &ExecutionEvent) -> Result<(), StoreError> {
        self.events
            .write()
            .await
            .entry(event.correlation_id.clone())
            .or_default()
            .push(event.clone());
        Ok(())
    }

    async fn events(&self, correlation_id: &CorrelationId) -> Result<Vec<ExecutionEvent>, StoreError> {
        Ok(self
            .events
            .read()
            .await
            .get(correlation_id)
            .cloned()
            .unwrap_or_default())
    }
}
