//! Per-plan execution record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::errors::{FailureKind, LifecycleError};
use super::event::ExecutionEvent;
use super::phase::{LifecyclePhase, LifecycleStateMachine};
use crate::domain::shared::{
    BrokerOrderId, ContingentOrderId, CorrelationId, DomainError, Symbol,
};

/// Mutable state of one trade lifecycle.
///
/// Owned by a single orchestrator run. All phase changes go through
/// [`ExecutionRecord::transition`] so the event list mirrors the phase
/// history exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// Batch the plan belongs to.
    pub correlation_id: CorrelationId,
    /// Trading symbol.
    pub symbol: Symbol,
    phase: LifecyclePhase,
    /// Set once the buy is accepted.
    pub buy_order_id: Option<BrokerOrderId>,
    /// Set once the contingent order is accepted.
    pub contingent_order_id: Option<ContingentOrderId>,
    /// Average fill price reported by the broker.
    pub fill_price: Option<Decimal>,
    /// Terminal error message.
    pub error: Option<String>,
    /// Terminal failure classification.
    pub failure_kind: Option<FailureKind>,
    events: Vec<ExecutionEvent>,
}

impl ExecutionRecord {
    /// Create a record in `STARTED`, emitting the first event.
    #[must_use]
    pub fn start(correlation_id: CorrelationId, symbol: Symbol, now: DateTime<Utc>) -> Self {
        let message = format!("Starting execution for {symbol}");
        let first = ExecutionEvent {
            correlation_id: correlation_id.clone(),
            symbol: symbol.clone(),
            phase: LifecyclePhase::Started,
            message,
            order_id: None,
            failure_kind: None,
            sequence: 0,
            timestamp: now,
        };
        Self {
            correlation_id,
            symbol,
            phase: LifecyclePhase::Started,
            buy_order_id: None,
            contingent_order_id: None,
            fill_price: None,
            error: None,
            failure_kind: None,
            events: vec![first],
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    /// Events in emission order.
    #[must_use]
    pub fn events(&self) -> &[ExecutionEvent] {
        &self.events
    }

    /// Most recent event.
    #[must_use]
    pub fn last_event(&self) -> Option<&ExecutionEvent> {
        self.events.last()
    }

    /// Check if the lifecycle has ended.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Check if the lifecycle ended in `COMPLETED`.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.phase == LifecyclePhase::Completed
    }

    /// Move to `to` and append its event.
    ///
    /// # Errors
    ///
    /// Returns error if the transition is not allowed from the current phase.
    pub fn transition(
        &mut self,
        to: LifecyclePhase,
        message: impl Into<String>,
        order_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<&ExecutionEvent, DomainError> {
        self.push(to, message.into(), order_id, None, now)
    }

    /// Move to the terminal phase for `error` and append its event.
    ///
    /// # Errors
    ///
    /// Returns error if the record is already terminal.
    pub fn fail(
        &mut self,
        error: &LifecycleError,
        now: DateTime<Utc>,
    ) -> Result<&ExecutionEvent, DomainError> {
        let kind = error.failure_kind();
        let message = error.to_string();
        let order_id = error
            .order_id()
            .or(self.buy_order_id.as_ref())
            .map(ToString::to_string);

        self.push(error.terminal_phase(), message.clone(), order_id, Some(kind), now)?;
        self.error = Some(message);
        self.failure_kind = Some(kind);
        self.latest_event()
    }

    fn push(
        &mut self,
        to: LifecyclePhase,
        message: String,
        order_id: Option<String>,
        failure_kind: Option<FailureKind>,
        now: DateTime<Utc>,
    ) -> Result<&ExecutionEvent, DomainError> {
        LifecycleStateMachine::validate_transition(self.phase, to)?;

        let sequence = u32::try_from(self.events.len()).unwrap_or(u32::MAX);
        self.phase = to;
        self.events.push(ExecutionEvent {
            correlation_id: self.correlation_id.clone(),
            symbol: self.symbol.clone(),
            phase: to,
            message,
            order_id,
            failure_kind,
            sequence,
            timestamp: now,
        });
        self.latest_event()
    }

    fn latest_event(&self) -> Result<&ExecutionEvent, DomainError> {
        self.events.last().ok_or_else(|| DomainError::BusinessRuleViolation {
            rule: "EVENT_LOG".to_string(),
            message: "execution record has no events".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 5, 0, 0).unwrap()
    }

    fn record() -> ExecutionRecord {
        ExecutionRecord::start(CorrelationId::new("batch-1"), Symbol::new("TCS"), now())
    }

    #[test]
    fn start_emits_first_event() {
        let rec = record();
        assert_eq!(rec.phase(), LifecyclePhase::Started);
        assert_eq!(rec.events().len(), 1);
        assert_eq!(rec.events()[0].sequence, 0);
        assert_eq!(rec.events()[0].phase, LifecyclePhase::Started);
    }

    #[test]
    fn transition_appends_sequenced_events() {
        let mut rec = record();
        rec.transition(LifecyclePhase::OrderPlacing, "placing", None, now())
            .unwrap();
        let event = rec
            .transition(
                LifecyclePhase::OrderPlaced,
                "placed",
                Some("ORD-1".to_string()),
                now(),
            )
            .unwrap();
        assert_eq!(event.sequence, 2);
        assert_eq!(event.order_id.as_deref(), Some("ORD-1"));
        assert_eq!(rec.phase(), LifecyclePhase::OrderPlaced);
    }

    #[test]
    fn invalid_transition_leaves_record_untouched() {
        let mut rec = record();
        assert!(
            rec.transition(LifecyclePhase::Completed, "skip", None, now())
                .is_err()
        );
        assert_eq!(rec.phase(), LifecyclePhase::Started);
        assert_eq!(rec.events().len(), 1);
    }

    #[test]
    fn fail_records_kind_and_single_terminal_event() {
        let mut rec = record();
        let err = LifecycleError::MarketClosed {
            message: "Market is closed for today.".to_string(),
        };
        let event = rec.fail(&err, now()).unwrap();
        assert_eq!(event.phase, LifecyclePhase::MarketClosed);
        assert_eq!(event.failure_kind, Some(FailureKind::MarketClosed));

        assert!(rec.is_terminal());
        assert_eq!(rec.failure_kind, Some(FailureKind::MarketClosed));
        assert_eq!(rec.error.as_deref(), Some("Market is closed for today."));

        // a second terminal event is refused
        assert!(rec.fail(&err, now()).is_err());
        assert_eq!(rec.events().iter().filter(|e| e.is_terminal()).count(), 1);
    }

    #[test]
    fn fail_carries_buy_order_id() {
        let mut rec = record();
        rec.transition(LifecyclePhase::OrderPlacing, "placing", None, now())
            .unwrap();
        rec.buy_order_id = Some(BrokerOrderId::new("ORD-9"));
        rec.transition(LifecyclePhase::OrderPlaced, "placed", None, now())
            .unwrap();

        let err = LifecycleError::SubmissionFailure {
            message: "boom".to_string(),
        };
        let event = rec.fail(&err, now()).unwrap();
        assert_eq!(event.order_id.as_deref(), Some("ORD-9"));
    }
}
