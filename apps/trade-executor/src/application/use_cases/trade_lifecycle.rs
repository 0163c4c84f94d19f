//! Trade Lifecycle Use Case
//!
//! Drives one approved trade plan from market-hours admission through
//! entry, fill wait and protection to a terminal phase, emitting one event
//! per transition to the observer in transition order.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{
    BrokerError, BrokerGateway, BrokerOrderStatus, ClockPort, ExecutionContext, ExecutionObserver,
    OrderStatusReport,
};
use crate::application::services::ContingentOrderPlacer;
use crate::domain::market_hours::MarketHoursGate;
use crate::domain::position_sizing::TradePlan;
use crate::domain::shared::BrokerOrderId;
use crate::domain::trade_lifecycle::{ExecutionRecord, LifecycleError, LifecyclePhase};
use crate::observability;

/// Fill-wait timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleSettings {
    /// Delay between order status polls.
    pub poll_interval: Duration,
    /// Total budget for the fill wait.
    pub fill_timeout: Duration,
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            fill_timeout: Duration::from_secs(300),
        }
    }
}

/// Drives single trade plans through their lifecycle.
///
/// Holds no per-plan state; each [`TradeLifecycleOrchestrator::execute`]
/// call owns its own [`ExecutionRecord`], so one orchestrator can run many
/// plans concurrently.
pub struct TradeLifecycleOrchestrator<B, O>
where
    B: BrokerGateway,
    O: ExecutionObserver,
{
    broker: Arc<B>,
    observer: Arc<O>,
    placer: ContingentOrderPlacer<B>,
    gate: MarketHoursGate,
    clock: Arc<dyn ClockPort>,
    settings: LifecycleSettings,
}

impl<B, O> TradeLifecycleOrchestrator<B, O>
where
    B: BrokerGateway,
    O: ExecutionObserver,
{
    /// Create a new orchestrator.
    pub fn new(
        broker: Arc<B>,
        observer: Arc<O>,
        gate: MarketHoursGate,
        clock: Arc<dyn ClockPort>,
        settings: LifecycleSettings,
    ) -> Self {
        Self {
            placer: ContingentOrderPlacer::new(Arc::clone(&broker)),
            broker,
            observer,
            gate,
            clock,
            settings,
        }
    }

    /// Market-hours gate used for admission.
    #[must_use]
    pub const fn gate(&self) -> &MarketHoursGate {
        &self.gate
    }

    /// Clock used for admission and event timestamps.
    #[must_use]
    pub fn clock(&self) -> &dyn ClockPort {
        self.clock.as_ref()
    }

    /// Run one plan to a terminal phase.
    ///
    /// Never fails: every failure is folded into the returned record as a
    /// terminal phase with exactly one terminal event.
    pub async fn execute(&self, ctx: &ExecutionContext, plan: &TradePlan) -> ExecutionRecord {
        let mut record = ExecutionRecord::start(
            ctx.correlation_id.clone(),
            plan.symbol.clone(),
            self.clock.now(),
        );
        if let Some(event) = record.last_event() {
            self.observer.on_event(event.clone()).await;
        }

        if let Err(err) = self.drive(ctx, plan, &mut record).await {
            self.terminate(&mut record, &err).await;
        }

        observability::record_lifecycle_terminal(record.phase().as_str());
        record
    }

    async fn drive(
        &self,
        ctx: &ExecutionContext,
        plan: &TradePlan,
        record: &mut ExecutionRecord,
    ) -> Result<(), LifecycleError> {
        let (open, message) = self.gate.precheck_market_open(self.clock.now());
        if !open {
            return Err(LifecycleError::MarketClosed { message });
        }

        // ---- Entry ----
        self.advance(
            record,
            LifecyclePhase::OrderPlacing,
            format!("Placing market BUY for {} x {}", plan.quantity, plan.symbol),
            None,
        )
        .await?;

        let order_id = match self
            .broker
            .submit_market_buy(ctx, &plan.symbol, plan.quantity)
            .await
        {
            Ok(id) => {
                observability::record_order_submission("accepted");
                id
            }
            Err(BrokerError::MarketClosed { message }) => {
                observability::record_order_submission("market_closed");
                return Err(LifecycleError::MarketClosed { message });
            }
            Err(e) => {
                observability::record_order_submission("rejected");
                return Err(LifecycleError::SubmissionFailure {
                    message: e.to_string(),
                });
            }
        };

        record.buy_order_id = Some(order_id.clone());
        self.advance(
            record,
            LifecyclePhase::OrderPlaced,
            format!("Buy order placed: {order_id}"),
            Some(order_id.to_string()),
        )
        .await?;

        // ---- Fill wait ----
        self.advance(
            record,
            LifecyclePhase::OrderMonitoring,
            format!(
                "Waiting for fill (timeout {}s)",
                self.settings.fill_timeout.as_secs()
            ),
            Some(order_id.to_string()),
        )
        .await?;

        let report = self.wait_for_fill(ctx, &order_id).await?;
        record.fill_price = report.average_price;
        let fill_text = report
            .average_price
            .map_or_else(|| "market".to_string(), |p| p.to_string());
        self.advance(
            record,
            LifecyclePhase::OrderFilled,
            format!("Buy order filled at {fill_text}"),
            Some(order_id.to_string()),
        )
        .await?;

        // ---- Protection ----
        self.advance(
            record,
            LifecyclePhase::GttPlacing,
            format!(
                "Placing GTT: stop-loss {} / target {}",
                plan.stop_loss, plan.target_price
            ),
            None,
        )
        .await?;

        let contingent_id = match self.placer.place(ctx, plan, report.average_price).await {
            Ok(id) => {
                observability::record_contingent_placement("placed");
                id
            }
            Err(e) => {
                observability::record_contingent_placement("failed");
                return Err(LifecycleError::ProtectionPlacementFailure {
                    order_id,
                    quantity: plan.quantity,
                    message: e.to_string(),
                });
            }
        };

        record.contingent_order_id = Some(contingent_id.clone());
        self.advance(
            record,
            LifecyclePhase::GttPlaced,
            format!("GTT placed: {contingent_id}"),
            Some(contingent_id.to_string()),
        )
        .await?;

        self.advance(
            record,
            LifecyclePhase::Completed,
            format!("Execution completed for {}", plan.symbol),
            None,
        )
        .await
    }

    /// Poll until the buy reaches a terminal status or the budget runs out.
    ///
    /// The budget is enforced by a timer task that cancels `deadline`; the
    /// poll loop and every in-flight status request race against it.
    async fn wait_for_fill(
        &self,
        ctx: &ExecutionContext,
        order_id: &BrokerOrderId,
    ) -> Result<OrderStatusReport, LifecycleError> {
        let deadline = CancellationToken::new();
        let timer = {
            let token = deadline.clone();
            let budget = self.settings.fill_timeout;
            tokio::spawn(async move {
                tokio::time::sleep(budget).await;
                token.cancel();
            })
        };

        let started = Instant::now();
        let outcome = self.poll_until_terminal(ctx, order_id, &deadline).await;
        timer.abort();

        let label = match &outcome {
            Ok(_) => "filled",
            Err(LifecycleError::TimeoutNoFill { .. }) => "timeout",
            Err(_) => "rejected",
        };
        observability::record_fill_outcome(label, started.elapsed().as_secs_f64());
        outcome
    }

    async fn poll_until_terminal(
        &self,
        ctx: &ExecutionContext,
        order_id: &BrokerOrderId,
        deadline: &CancellationToken,
    ) -> Result<OrderStatusReport, LifecycleError> {
        let timed_out = || LifecycleError::TimeoutNoFill {
            order_id: order_id.clone(),
            timeout_secs: self.settings.fill_timeout.as_secs(),
        };

        let mut ticker = tokio::time::interval(self.settings.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut attempt: u32 = 0;

        loop {
            tokio::select! {
                biased;
                () = deadline.cancelled() => return Err(timed_out()),
                _ = ticker.tick() => {}
            }
            attempt += 1;

            let polled = tokio::select! {
                biased;
                () = deadline.cancelled() => return Err(timed_out()),
                polled = self.broker.get_order_status(ctx, order_id) => polled,
            };

            match polled {
                Ok(report) => match report.status {
                    BrokerOrderStatus::Complete => return Ok(report),
                    BrokerOrderStatus::Cancelled | BrokerOrderStatus::Rejected => {
                        return Err(LifecycleError::FillRejected {
                            order_id: order_id.clone(),
                            status: report.status.to_string(),
                        });
                    }
                    ref status => {
                        tracing::debug!(
                            correlation_id = %ctx.correlation_id,
                            order_id = %order_id,
                            %status,
                            attempt,
                            "Order not yet filled"
                        );
                    }
                },
                Err(e) => {
                    observability::record_poll_error();
                    tracing::warn!(
                        correlation_id = %ctx.correlation_id,
                        order_id = %order_id,
                        attempt,
                        error = %e,
                        "Order status poll failed, retrying"
                    );
                }
            }
        }
    }

    async fn advance(
        &self,
        record: &mut ExecutionRecord,
        to: LifecyclePhase,
        message: String,
        order_id: Option<String>,
    ) -> Result<(), LifecycleError> {
        let event = record
            .transition(to, message, order_id, self.clock.now())?
            .clone();

        tracing::info!(
            correlation_id = %event.correlation_id,
            symbol = %event.symbol,
            phase = %event.phase,
            order_id = event.order_id.as_deref().unwrap_or(""),
            "{}",
            event.message
        );

        self.observer.on_event(event).await;
        Ok(())
    }

    async fn terminate(&self, record: &mut ExecutionRecord, err: &LifecycleError) {
        let now = self.clock.now();
        let event = match record.fail(err, now) {
            Ok(event) => event.clone(),
            Err(e) => {
                tracing::error!(
                    correlation_id = %record.correlation_id,
                    symbol = %record.symbol,
                    phase = %record.phase(),
                    error = %e,
                    "Could not record terminal failure"
                );
                return;
            }
        };

        if err.failure_kind().requires_reconciliation() {
            tracing::error!(
                correlation_id = %event.correlation_id,
                symbol = %event.symbol,
                phase = %event.phase,
                failure_kind = ?err.failure_kind(),
                "{}",
                event.message
            );
        } else {
            tracing::warn!(
                correlation_id = %event.correlation_id,
                symbol = %event.symbol,
                phase = %event.phase,
                failure_kind = ?err.failure_kind(),
                "{}",
                event.message
            );
        }

        self.observer.on_event(event).await;
    }
}
