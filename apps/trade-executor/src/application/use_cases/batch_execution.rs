//! Batch Execution Use Case
//!
//! Prepares a batch of trade proposals (normalize, size, scale), holds it
//! for user confirmation, admits it against market hours and drives every
//! plan through the lifecycle orchestrator.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::application::dto::{
    BatchStatusReport, PlanOutcome, PreparedBatch, ProposalNote, QuantityOverride,
};
use crate::application::ports::{
    BatchStatus, BrokerError, BrokerGateway, ExecutionContext, ExecutionObserver,
    ExecutionStorePort, StoreError,
};
use crate::application::use_cases::TradeLifecycleOrchestrator;
use crate::domain::position_sizing::{
    DEFAULT_SAFETY_MARGIN, ExposureScaler, PortfolioMetrics, RiskSizer, TradePlan, TradeProposal,
};
use crate::domain::shared::{CorrelationId, Symbol};
use crate::domain::trade_lifecycle::ExecutionRecord;
use crate::observability;

/// Largest risk percent accepted per trade.
const MAX_RISK_PERCENT: Decimal = dec!(5);

/// Batch-level settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
    /// Plans driven at once; 1 runs them sequentially.
    pub max_concurrent_plans: usize,
    /// Risk percent when the caller does not supply one.
    pub default_risk_percent: Decimal,
    /// Fraction of balance a scaled batch may consume.
    pub safety_margin: Decimal,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            max_concurrent_plans: 1,
            default_risk_percent: Decimal::ONE,
            safety_margin: DEFAULT_SAFETY_MARGIN,
        }
    }
}

/// Batch use case error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BatchError {
    /// Every proposal was dropped during normalization or sizing.
    #[error("No viable trade plans: all {proposals} proposals were dropped")]
    NoViablePlans {
        /// Proposals received.
        proposals: usize,
    },

    /// Aggregate investment exceeds the balance even after scaling.
    #[error("Total investment {total_investment} exceeds available balance {available_balance}")]
    ExceedsBalance {
        /// Aggregate investment after scaling.
        total_investment: Decimal,
        /// Broker balance.
        available_balance: Decimal,
    },

    /// Exchange closed at admission; nothing was submitted.
    #[error("{0}")]
    MarketClosed(String),

    /// Risk percent outside (0, 5].
    #[error("Risk percent must be in (0, 5], got {0}")]
    InvalidRiskPercent(Decimal),

    /// Quantity override rejected.
    #[error("Invalid override for {symbol}: {message}")]
    InvalidOverride {
        /// Symbol.
        symbol: Symbol,
        /// Reason.
        message: String,
    },

    /// Batch unknown to the store.
    #[error("Batch not found: {0}")]
    NotFound(CorrelationId),

    /// Operation not allowed in the batch's current state.
    #[error("Batch {batch_id} is {status}: {message}")]
    InvalidState {
        /// Batch id.
        batch_id: CorrelationId,
        /// Current status.
        status: BatchStatus,
        /// What was attempted.
        message: String,
    },

    /// Broker failure during preparation.
    #[error(transparent)]
    Broker(#[from] BrokerError),

    /// Store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Use case for preparing, confirming and executing trade batches.
pub struct BatchExecutionUseCase<B, O, S>
where
    B: BrokerGateway,
    O: ExecutionObserver,
    S: ExecutionStorePort,
{
    broker: Arc<B>,
    store: Arc<S>,
    orchestrator: TradeLifecycleOrchestrator<B, O>,
    settings: BatchSettings,
}

impl<B, O, S> BatchExecutionUseCase<B, O, S>
where
    B: BrokerGateway,
    O: ExecutionObserver,
    S: ExecutionStorePort,
{
    /// Create a new use case.
    pub const fn new(
        broker: Arc<B>,
        store: Arc<S>,
        orchestrator: TradeLifecycleOrchestrator<B, O>,
        settings: BatchSettings,
    ) -> Self {
        Self {
            broker,
            store,
            orchestrator,
            settings,
        }
    }

    /// Size a batch of proposals and store it for confirmation.
    ///
    /// The batch id is `ctx.correlation_id`.
    ///
    /// # Errors
    ///
    /// Returns error if the balance cannot be fetched, the risk percent is
    /// out of range, no proposal survives sizing, or the scaled batch still
    /// exceeds the balance.
    pub async fn prepare(
        &self,
        ctx: &ExecutionContext,
        proposals: Vec<TradeProposal>,
        risk_percent: Option<Decimal>,
    ) -> Result<PreparedBatch, BatchError> {
        let risk_percent = risk_percent.unwrap_or(self.settings.default_risk_percent);
        if risk_percent <= Decimal::ZERO || risk_percent > MAX_RISK_PERCENT {
            return Err(BatchError::InvalidRiskPercent(risk_percent));
        }

        let balance = self.broker.get_balance(ctx).await?;
        tracing::info!(
            correlation_id = %ctx.correlation_id,
            %balance,
            %risk_percent,
            proposals = proposals.len(),
            "Preparing batch"
        );

        let proposal_count = proposals.len();
        let mut notes = Vec::new();
        let mut plans = BTreeMap::new();

        for proposal in proposals {
            let symbol = proposal.symbol.clone();
            let normalized = match proposal.normalize() {
                Ok(n) => n,
                Err(e) => {
                    tracing::warn!(%symbol, error = %e, "Skipping proposal");
                    notes.push(ProposalNote::Skipped {
                        symbol,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            for adjustment in normalized.adjustments {
                tracing::warn!(%symbol, ?adjustment, "Corrected proposal");
                notes.push(ProposalNote::Adjusted {
                    symbol: symbol.clone(),
                    adjustment,
                });
            }

            if plans.contains_key(&symbol) {
                notes.push(ProposalNote::Skipped {
                    symbol,
                    reason: "duplicate symbol in batch".to_string(),
                });
                continue;
            }

            match RiskSizer::size(
                &normalized.proposal,
                risk_percent,
                balance,
                &ctx.correlation_id,
            ) {
                Some(sized) => {
                    if let Err(e) = sized.plan.validate_price_ordering() {
                        tracing::warn!(%symbol, error = %e, "Price ordering broken, skipping");
                        notes.push(ProposalNote::Skipped {
                            symbol,
                            reason: e.to_string(),
                        });
                        continue;
                    }
                    plans.insert(symbol, sized);
                }
                None => {
                    tracing::info!(%symbol, "Risk budget does not cover one share, skipping");
                    notes.push(ProposalNote::Skipped {
                        symbol,
                        reason: "risk budget does not cover a single share".to_string(),
                    });
                }
            }
        }

        if plans.is_empty() {
            return Err(BatchError::NoViablePlans {
                proposals: proposal_count,
            });
        }

        let scaling = ExposureScaler::new(self.settings.safety_margin).scale(&mut plans, balance);
        let metrics = PortfolioMetrics::from_plans(plans.values(), balance);

        if metrics.total_investment > balance {
            return Err(BatchError::ExceedsBalance {
                total_investment: metrics.total_investment,
                available_balance: balance,
            });
        }

        let batch = PreparedBatch {
            batch_id: ctx.correlation_id.clone(),
            status: BatchStatus::PendingConfirmation,
            available_balance: balance,
            risk_percent,
            plans,
            notes,
            scaling,
            metrics,
            confirmed_at: None,
            outcomes: Vec::new(),
            created_at: self.orchestrator.clock().now(),
        };
        self.store.save_batch(&batch).await?;

        tracing::info!(
            correlation_id = %batch.batch_id,
            plans = batch.plans.len(),
            total_investment = %batch.metrics.total_investment,
            "Batch prepared, awaiting confirmation"
        );
        Ok(batch)
    }

    /// Approve or decline a prepared batch.
    ///
    /// Declining marks it `CANCELLED`. Approving applies per-symbol quantity
    /// overrides (amounts recomputed) and records the confirmation time.
    ///
    /// # Errors
    ///
    /// Returns error if the batch is unknown, not awaiting confirmation, or
    /// an override sets a zero quantity.
    pub async fn confirm(
        &self,
        batch_id: &CorrelationId,
        confirmed: bool,
        overrides: &[QuantityOverride],
    ) -> Result<PreparedBatch, BatchError> {
        let mut batch = self.load(batch_id).await?;
        if batch.status != BatchStatus::PendingConfirmation {
            return Err(BatchError::InvalidState {
                batch_id: batch_id.clone(),
                status: batch.status,
                message: "only a pending batch can be confirmed".to_string(),
            });
        }

        if !confirmed {
            batch.status = BatchStatus::Cancelled;
            self.store.save_batch(&batch).await?;
            tracing::info!(correlation_id = %batch_id, "Batch cancelled by user");
            return Ok(batch);
        }

        for edit in overrides {
            if edit.quantity == 0 {
                return Err(BatchError::InvalidOverride {
                    symbol: edit.symbol.clone(),
                    message: "quantity must be at least 1".to_string(),
                });
            }
            match batch.plans.get_mut(&edit.symbol) {
                Some(sized) => {
                    tracing::info!(
                        correlation_id = %batch_id,
                        symbol = %edit.symbol,
                        from = sized.quantity(),
                        to = edit.quantity,
                        "Quantity override applied"
                    );
                    sized.set_quantity(edit.quantity);
                }
                None => {
                    tracing::warn!(
                        correlation_id = %batch_id,
                        symbol = %edit.symbol,
                        "Override for symbol not in batch, ignoring"
                    );
                }
            }
        }

        batch.metrics = PortfolioMetrics::from_plans(batch.plans.values(), batch.available_balance);
        batch.confirmed_at = Some(self.orchestrator.clock().now());
        self.store.save_batch(&batch).await?;
        Ok(batch)
    }

    /// Admit a confirmed batch and drive every plan to a terminal phase.
    ///
    /// The batch id is `ctx.correlation_id`. When the market is closed the
    /// batch stays pending and no broker call is made.
    ///
    /// # Errors
    ///
    /// Returns error if the batch is unknown or unconfirmed, the market is
    /// closed, or the store fails. Per-plan failures are not errors; they
    /// are reported in the batch outcomes and final status.
    pub async fn execute(&self, ctx: &ExecutionContext) -> Result<PreparedBatch, BatchError> {
        let batch_id = &ctx.correlation_id;
        let mut batch = self.load(batch_id).await?;

        if batch.status != BatchStatus::PendingConfirmation || batch.confirmed_at.is_none() {
            return Err(BatchError::InvalidState {
                batch_id: batch_id.clone(),
                status: batch.status,
                message: "only a confirmed pending batch can be executed".to_string(),
            });
        }

        let (open, message) = self
            .orchestrator
            .gate()
            .precheck_market_open(self.orchestrator.clock().now());
        if !open {
            tracing::warn!(correlation_id = %batch_id, %message, "Execution blocked, market closed");
            return Err(BatchError::MarketClosed(message));
        }

        batch.status = BatchStatus::Executing;
        self.store
            .set_batch_status(batch_id, BatchStatus::Executing)
            .await?;

        let plans: Vec<TradePlan> = batch.plans.values().map(|s| s.plan.clone()).collect();
        let mut records = self.run_plans(ctx, &plans).await;
        records.sort_by(|a, b| a.symbol.cmp(&b.symbol));

        let completed = records.iter().filter(|r| r.is_completed()).count();
        batch.status = if completed == records.len() && completed > 0 {
            BatchStatus::Completed
        } else if completed > 0 {
            BatchStatus::Partial
        } else {
            BatchStatus::Failed
        };
        batch.outcomes = records.iter().map(PlanOutcome::from).collect();
        self.store.save_batch(&batch).await?;

        observability::record_batch_status(batch.status.as_str());
        tracing::info!(
            correlation_id = %batch_id,
            status = %batch.status,
            completed,
            total = records.len(),
            "Batch execution finished"
        );
        Ok(batch)
    }

    /// Execution status of a batch.
    ///
    /// # Errors
    ///
    /// Returns error if the batch is unknown or the store fails.
    pub async fn status(&self, batch_id: &CorrelationId) -> Result<BatchStatusReport, BatchError> {
        let batch = self.load(batch_id).await?;
        let events = self.store.events(batch_id).await?;
        Ok(BatchStatusReport::from_events(
            &batch,
            events,
            self.orchestrator.clock().now(),
        ))
    }

    async fn run_plans(&self, ctx: &ExecutionContext, plans: &[TradePlan]) -> Vec<ExecutionRecord> {
        let limit = self.settings.max_concurrent_plans.max(1);
        if limit == 1 {
            let mut records = Vec::with_capacity(plans.len());
            for plan in plans {
                records.push(self.orchestrator.execute(ctx, plan).await);
            }
            return records;
        }

        stream::iter(plans)
            .map(|plan| self.orchestrator.execute(ctx, plan))
            .buffer_unordered(limit)
            .collect()
            .await
    }

    async fn load(&self, batch_id: &CorrelationId) -> Result<PreparedBatch, BatchError> {
        self.store
            .load_batch(batch_id)
            .await?
            .ok_or_else(|| BatchError::NotFound(batch_id.clone()))
    }
}
