//! Progress events emitted by a trade lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::FailureKind;
use super::phase::LifecyclePhase;
use crate::domain::shared::{CorrelationId, Symbol};

/// One lifecycle transition, as seen by observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionEvent {
    /// Batch the plan belongs to.
    pub correlation_id: CorrelationId,
    /// Trading symbol.
    pub symbol: Symbol,
    /// Phase entered.
    pub phase: LifecyclePhase,
    /// Human-readable message.
    pub message: String,
    /// Broker order or trigger id relevant to this phase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Set on terminal failure events only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_kind: Option<FailureKind>,
    /// Position within this lifecycle's event stream, starting at 0.
    pub sequence: u32,
    /// When the transition happened.
    pub timestamp: DateTime<Utc>,
}

impl ExecutionEvent {
    /// Check if this event ends its lifecycle.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }
}
