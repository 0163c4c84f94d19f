//! Terminal failure taxonomy for a trade lifecycle.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::phase::LifecyclePhase;
use crate::domain::shared::{BrokerOrderId, DomainError};

/// Machine-readable failure classification carried on terminal events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// Exchange closed before or during submission.
    MarketClosed,
    /// Broker rejected or errored on the buy submission.
    SubmissionFailure,
    /// Broker reported the buy cancelled or rejected.
    FillRejected,
    /// No terminal broker status within the fill timeout.
    TimeoutNoFill,
    /// Entry filled but the contingent order could not be placed.
    ProtectionPlacementFailure,
    /// Lifecycle invariant broken inside the executor.
    Internal,
}

impl FailureKind {
    /// Whether the broker may hold an open or resting position that needs
    /// manual reconciliation.
    #[must_use]
    pub const fn requires_reconciliation(&self) -> bool {
        matches!(self, Self::ProtectionPlacementFailure | Self::TimeoutNoFill)
    }
}

/// Why a lifecycle ended without reaching `COMPLETED`.
///
/// The `Display` text is the message of the terminal event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// Exchange closed; nothing was submitted.
    #[error("{message}")]
    MarketClosed {
        /// Explanation from the gate or broker.
        message: String,
    },

    /// Buy submission failed.
    #[error("Failed to place buy order: {message}")]
    SubmissionFailure {
        /// Broker error text.
        message: String,
    },

    /// Buy order ended cancelled or rejected.
    #[error("Buy order {order_id} was {status} by the broker; no position was opened")]
    FillRejected {
        /// Broker order id.
        order_id: BrokerOrderId,
        /// Broker status text.
        status: String,
    },

    /// Fill wait timed out.
    #[error(
        "Buy order {order_id} was not filled within {timeout_secs}s; the order is still resting at the broker and must be reconciled manually"
    )]
    TimeoutNoFill {
        /// Broker order id.
        order_id: BrokerOrderId,
        /// Fill timeout that elapsed.
        timeout_secs: u64,
    },

    /// Contingent placement failed after a confirmed fill.
    #[error(
        "Entry order {order_id} FILLED ({quantity} shares) but protective GTT placement failed: {message}. Position is OPEN and UNPROTECTED; place a stop-loss manually"
    )]
    ProtectionPlacementFailure {
        /// Filled buy order id.
        order_id: BrokerOrderId,
        /// Shares held without protection.
        quantity: u64,
        /// Broker error text.
        message: String,
    },

    /// Lifecycle invariant violation.
    #[error("Lifecycle error: {0}")]
    Internal(#[from] DomainError),
}

impl LifecycleError {
    /// Failure classification.
    #[must_use]
    pub const fn failure_kind(&self) -> FailureKind {
        match self {
            Self::MarketClosed { .. } => FailureKind::MarketClosed,
            Self::SubmissionFailure { .. } => FailureKind::SubmissionFailure,
            Self::FillRejected { .. } => FailureKind::FillRejected,
            Self::TimeoutNoFill { .. } => FailureKind::TimeoutNoFill,
            Self::ProtectionPlacementFailure { .. } => FailureKind::ProtectionPlacementFailure,
            Self::Internal(_) => FailureKind::Internal,
        }
    }

    /// Terminal phase this failure lands in.
    #[must_use]
    pub const fn terminal_phase(&self) -> LifecyclePhase {
        match self {
            Self::MarketClosed { .. } => LifecyclePhase::MarketClosed,
            Self::TimeoutNoFill { .. } => LifecyclePhase::OrderTimeout,
            _ => LifecyclePhase::Failed,
        }
    }

    /// Order id related to the failure, if one exists.
    #[must_use]
    pub const fn order_id(&self) -> Option<&BrokerOrderId> {
        match self {
            Self::FillRejected { order_id, .. }
            | Self::TimeoutNoFill { order_id, .. }
            | Self::ProtectionPlacementFailure { order_id, .. } => Some(order_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_phase_mapping() {
        let closed = LifecycleError::MarketClosed {
            message: "closed".to_string(),
        };
        assert_eq!(closed.terminal_phase(), LifecyclePhase::MarketClosed);

        let timeout = LifecycleError::TimeoutNoFill {
            order_id: BrokerOrderId::new("1"),
            timeout_secs: 300,
        };
        assert_eq!(timeout.terminal_phase(), LifecyclePhase::OrderTimeout);
        assert!(timeout.failure_kind().requires_reconciliation());

        let rejected = LifecycleError::FillRejected {
            order_id: BrokerOrderId::new("1"),
            status: "REJECTED".to_string(),
        };
        assert_eq!(rejected.terminal_phase(), LifecyclePhase::Failed);
        assert!(!rejected.failure_kind().requires_reconciliation());
    }

    #[test]
    fn protection_failure_distinguishes_open_position() {
        let err = LifecycleError::ProtectionPlacementFailure {
            order_id: BrokerOrderId::new("230101000001"),
            quantity: 10,
            message: "Trigger price too close".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("FILLED"));
        assert!(msg.contains("UNPROTECTED"));
        assert_eq!(err.terminal_phase(), LifecyclePhase::Failed);
        assert_eq!(err.failure_kind(), FailureKind::ProtectionPlacementFailure);
        assert_eq!(err.order_id().map(BrokerOrderId::as_str), Some("230101000001"));
    }
}
