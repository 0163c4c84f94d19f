//! Execution Store Port (Driven Port)
//!
//! Durable home for prepared batches, their status and the append-only
//! event log keyed by correlation id.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::application::dto::PreparedBatch;
use crate::domain::shared::CorrelationId;
use crate::domain::trade_lifecycle::ExecutionEvent;

/// Status of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    /// Sized and waiting for user confirmation.
    PendingConfirmation,
    /// Lifecycles running.
    Executing,
    /// Every plan completed.
    Completed,
    /// Some plans completed.
    Partial,
    /// No plan completed.
    Failed,
    /// Declined at confirmation.
    Cancelled,
}

impl BatchStatus {
    /// Wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PendingConfirmation => "PENDING_CONFIRMATION",
            Self::Executing => "EXECUTING",
            Self::Completed => "COMPLETED",
            Self::Partial => "PARTIAL",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Check if no further work will happen for the batch.
    #[must_use]
    pub const fn is_final(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Partial | Self::Failed | Self::Cancelled
        )
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Store error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Batch not found.
    #[error("Batch not found: {0}")]
    BatchNotFound(CorrelationId),

    /// Backend failure.
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Port for batch and event persistence.
#[async_trait]
pub trait ExecutionStorePort: Send + Sync {
    /// Insert or replace a prepared batch.
    async fn save_batch(&self, batch: &PreparedBatch) -> Result<(), StoreError>;

    /// Load a batch by id.
    async fn load_batch(&self, batch_id: &CorrelationId) -> Result<Option<PreparedBatch>, StoreError>;

    /// Update a batch's status.
    async fn set_batch_status(
        &self,
        batch_id: &CorrelationId,
        status: BatchStatus,
    ) -> Result<(), StoreError>;

    /// Append an event to the log.
    async fn append_event(&self, event: &ExecutionEvent) -> Result<(), StoreError>;

    /// Events for a correlation id, in append order.
    async fn events(&self, correlation_id: &CorrelationId) -> Result<Vec<ExecutionEvent>, StoreError>;
}
