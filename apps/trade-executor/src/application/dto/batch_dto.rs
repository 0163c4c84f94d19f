//! Batch DTOs.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::ports::BatchStatus;
use crate::domain::position_sizing::{
    PortfolioMetrics, ProposalAdjustment, ScalingOutcome, SizedPlan,
};
use crate::domain::shared::{BrokerOrderId, ContingentOrderId, CorrelationId, Symbol};
use crate::domain::trade_lifecycle::{ExecutionEvent, ExecutionRecord, FailureKind, LifecyclePhase};

/// What happened to one proposal during preparation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalNote {
    /// Proposal corrected during normalization.
    Adjusted {
        /// Symbol.
        symbol: Symbol,
        /// Correction applied.
        adjustment: ProposalAdjustment,
    },
    /// Proposal dropped.
    Skipped {
        /// Symbol.
        symbol: Symbol,
        /// Why it was dropped.
        reason: String,
    },
}

/// A sized batch waiting for, or past, confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedBatch {
    /// Batch id, also the correlation id of every event.
    pub batch_id: CorrelationId,
    /// Current status.
    pub status: BatchStatus,
    /// Balance reported by the broker at preparation.
    pub available_balance: Decimal,
    /// Risk percent used for sizing.
    pub risk_percent: Decimal,
    /// Sized plans keyed by symbol.
    pub plans: BTreeMap<Symbol, SizedPlan>,
    /// Normalization and sizing notes.
    pub notes: Vec<ProposalNote>,
    /// Exposure scaling result.
    pub scaling: ScalingOutcome,
    /// Aggregate figures.
    pub metrics: PortfolioMetrics,
    /// Set when the user approves the batch.
    #[serde(default)]
    pub confirmed_at: Option<DateTime<Utc>>,
    /// Per-plan results, filled in after execution.
    #[serde(default)]
    pub outcomes: Vec<PlanOutcome>,
    /// Preparation time.
    pub created_at: DateTime<Utc>,
}

/// User edit applied at confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityOverride {
    /// Symbol to edit.
    pub symbol: Symbol,
    /// Replacement quantity.
    pub quantity: u64,
}

/// Final result of one plan's lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanOutcome {
    /// Symbol.
    pub symbol: Symbol,
    /// Terminal phase.
    pub phase: LifecyclePhase,
    /// Buy order id, when submitted.
    pub buy_order_id: Option<BrokerOrderId>,
    /// Contingent order id, when placed.
    pub contingent_order_id: Option<ContingentOrderId>,
    /// Average fill price.
    pub fill_price: Option<Decimal>,
    /// Terminal error message.
    pub error: Option<String>,
    /// Terminal failure classification.
    pub failure_kind: Option<FailureKind>,
}

impl From<&ExecutionRecord> for PlanOutcome {
    fn from(record: &ExecutionRecord) -> Self {
        Self {
            symbol: record.symbol.clone(),
            phase: record.phase(),
            buy_order_id: record.buy_order_id.clone(),
            contingent_order_id: record.contingent_order_id.clone(),
            fill_price: record.fill_price,
            error: record.error.clone(),
            failure_kind: record.failure_kind,
        }
    }
}

/// Execution status of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStatusReport {
    /// Batch id.
    pub batch_id: CorrelationId,
    /// Overall status.
    pub overall_status: BatchStatus,
    /// Plans in the batch.
    pub total_plans: usize,
    /// Lifecycles that reached `COMPLETED`.
    pub completed: usize,
    /// Lifecycles that ended in any other terminal phase.
    pub failed: usize,
    /// Event log in append order.
    pub events: Vec<ExecutionEvent>,
    /// Preparation time.
    pub created_at: DateTime<Utc>,
    /// Report time.
    pub updated_at: DateTime<Utc>,
}

impl BatchStatusReport {
    /// Build a report from a batch and its event log.
    #[must_use]
    pub fn from_events(
        batch: &PreparedBatch,
        events: Vec<ExecutionEvent>,
        now: DateTime<Utc>,
    ) -> Self {
        let terminal = events.iter().filter(|e| e.is_terminal());
        let (completed, failed) = terminal.fold((0, 0), |(ok, bad), e| {
            if e.phase == LifecyclePhase::Completed {
                (ok + 1, bad)
            } else {
                (ok, bad + 1)
            }
        });

        Self {
            batch_id: batch.batch_id.clone(),
            overall_status: batch.status,
            total_plans: batch.plans.len(),
            completed,
            failed,
            events,
            created_at: batch.created_at,
            updated_at: now,
        }
    }
}
