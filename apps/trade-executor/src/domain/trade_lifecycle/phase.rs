//! Lifecycle phases and the transition table.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::DomainError;

/// Phase of a single trade lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecyclePhase {
    /// Record created, market gate not yet checked.
    Started,
    /// Market buy being submitted.
    OrderPlacing,
    /// Broker accepted the buy.
    OrderPlaced,
    /// Polling for a fill.
    OrderMonitoring,
    /// Broker reported the buy complete.
    OrderFilled,
    /// Contingent protection being submitted.
    GttPlacing,
    /// Broker accepted the contingent order.
    GttPlaced,
    /// Position entered and protected.
    Completed,
    /// No terminal broker status within the fill timeout.
    OrderTimeout,
    /// Exchange closed, nothing submitted.
    MarketClosed,
    /// Any other terminal failure.
    Failed,
}

impl LifecyclePhase {
    /// Wire name, e.g. `ORDER_PLACING`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "STARTED",
            Self::OrderPlacing => "ORDER_PLACING",
            Self::OrderPlaced => "ORDER_PLACED",
            Self::OrderMonitoring => "ORDER_MONITORING",
            Self::OrderFilled => "ORDER_FILLED",
            Self::GttPlacing => "GTT_PLACING",
            Self::GttPlaced => "GTT_PLACED",
            Self::Completed => "COMPLETED",
            Self::OrderTimeout => "ORDER_TIMEOUT",
            Self::MarketClosed => "MARKET_CLOSED",
            Self::Failed => "FAILED",
        }
    }

    /// Check if this phase ends the lifecycle.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::OrderTimeout | Self::MarketClosed | Self::Failed
        )
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validates lifecycle transitions.
pub struct LifecycleStateMachine;

impl LifecycleStateMachine {
    /// Check if a transition is allowed.
    #[must_use]
    pub const fn is_valid_transition(from: LifecyclePhase, to: LifecyclePhase) -> bool {
        use LifecyclePhase::{
            Completed, Failed, GttPlaced, GttPlacing, MarketClosed, OrderFilled,
            OrderMonitoring, OrderPlaced, OrderPlacing, OrderTimeout, Started,
        };
        matches!(
            (from, to),
            (Started, OrderPlacing | MarketClosed | Failed)
                | (OrderPlacing, OrderPlaced | MarketClosed | Failed)
                | (OrderPlaced, OrderMonitoring | Failed)
                | (OrderMonitoring, OrderFilled | OrderTimeout | Failed)
                | (OrderFilled, GttPlacing | Failed)
                | (GttPlacing, GttPlaced | Failed)
                | (GttPlaced, Completed | Failed)
        )
    }

    /// Validate a transition.
    ///
    /// # Errors
    ///
    /// Returns error if the transition is not in the table.
    pub fn validate_transition(from: LifecyclePhase, to: LifecyclePhase) -> Result<(), DomainError> {
        if Self::is_valid_transition(from, to) {
            return Ok(());
        }
        Err(DomainError::InvalidStateTransition {
            entity: "TradeLifecycle".to_string(),
            from: from.to_string(),
            to: to.to_string(),
            allowed: Self::valid_next_states(from)
                .iter()
                .map(ToString::to_string)
                .collect(),
        })
    }

    /// All phases reachable in one step.
    #[must_use]
    pub fn valid_next_states(from: LifecyclePhase) -> Vec<LifecyclePhase> {
        use LifecyclePhase::{
            Completed, Failed, GttPlaced, GttPlacing, MarketClosed, OrderFilled,
            OrderMonitoring, OrderPlaced, OrderPlacing, OrderTimeout, Started,
        };
        match from {
            Started => vec![OrderPlacing, MarketClosed, Failed],
            OrderPlacing => vec![OrderPlaced, MarketClosed, Failed],
            OrderPlaced => vec![OrderMonitoring, Failed],
            OrderMonitoring => vec![OrderFilled, OrderTimeout, Failed],
            OrderFilled => vec![GttPlacing, Failed],
            GttPlacing => vec![GttPlaced, Failed],
            GttPlaced => vec![Completed, Failed],
            Completed | OrderTimeout | MarketClosed | Failed => vec![],
        }
    }
}
