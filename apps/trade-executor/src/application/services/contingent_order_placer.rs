//! Contingent Order Placer
//!
//! Builds the two-leg protective exit for a filled long position and
//! submits it through the broker gateway.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::application::ports::{BrokerError, BrokerGateway, ExecutionContext};
use crate::domain::position_sizing::TradePlan;
use crate::domain::protection::{ContingentOrder, ContingentOrderBuilder};
use crate::domain::shared::{ContingentOrderId, DomainError};

/// Contingent placement error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PlacementError {
    /// Plan could not be turned into a valid contingent order.
    #[error("Invalid contingent order: {0}")]
    InvalidOrder(#[from] DomainError),

    /// Broker refused or failed the placement.
    #[error(transparent)]
    Broker(#[from] BrokerError),
}

/// Places stop-loss/target protection after a fill.
pub struct ContingentOrderPlacer<B: BrokerGateway> {
    broker: Arc<B>,
}

impl<B: BrokerGateway> ContingentOrderPlacer<B> {
    /// Create a new placer.
    pub const fn new(broker: Arc<B>) -> Self {
        Self { broker }
    }

    /// Build the protective order for `plan`.
    ///
    /// `fill_price` becomes the reference price when known, otherwise the
    /// plan's entry price is used.
    ///
    /// # Errors
    ///
    /// Returns error if the plan's quantity or prices do not form a valid
    /// contingent order.
    pub fn build_order(
        plan: &TradePlan,
        fill_price: Option<Decimal>,
    ) -> Result<ContingentOrder, DomainError> {
        ContingentOrderBuilder::new()
            .symbol(plan.symbol.clone())
            .quantity(plan.quantity)
            .reference_price(fill_price.unwrap_or(plan.entry_price))
            .stop_loss(plan.stop_loss)
            .target(plan.target_price)
            .build()
    }

    /// Build and submit the protective order.
    ///
    /// # Errors
    ///
    /// Returns error if the order is invalid or the broker rejects it.
    pub async fn place(
        &self,
        ctx: &ExecutionContext,
        plan: &TradePlan,
        fill_price: Option<Decimal>,
    ) -> Result<ContingentOrderId, PlacementError> {
        let order = Self::build_order(plan, fill_price)?;

        tracing::info!(
            correlation_id = %ctx.correlation_id,
            symbol = %order.symbol,
            quantity = order.quantity(),
            stop_loss = %order.stop_loss_leg().limit_price,
            target = %order.target_leg().limit_price,
            reference_price = %order.reference_price,
            "Placing contingent exit order"
        );

        let id = self.broker.submit_contingent_order(ctx, &order).await?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{OrderStatusReport, SessionCredential};
    use crate::domain::protection::LegKind;
    use crate::domain::shared::{BrokerOrderId, CorrelationId, OrderSide, Symbol};
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    // Mock broker that records contingent submissions
    struct MockBroker {
        should_fail: bool,
        submitted: Mutex<Vec<ContingentOrder>>,
    }

    impl MockBroker {
        fn new(should_fail: bool) -> Self {
            Self {
                should_fail,
                submitted: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl BrokerGateway for MockBroker {
        async fn submit_market_buy(
            &self,
            _ctx: &ExecutionContext,
            _symbol: &Symbol,
            _quantity: u64,
        ) -> Result<BrokerOrderId, BrokerError> {
            unreachable!("placer never buys")
        }

        async fn get_order_status(
            &self,
            _ctx: &ExecutionContext,
            _order_id: &BrokerOrderId,
        ) -> Result<OrderStatusReport, BrokerError> {
            unreachable!("placer never polls")
        }

        async fn submit_contingent_order(
            &self,
            _ctx: &ExecutionContext,
            order: &ContingentOrder,
        ) -> Result<ContingentOrderId, BrokerError> {
            if self.should_fail {
                return Err(BrokerError::OrderRejected {
                    reason: "Trigger price too close to last price".to_string(),
                });
            }
            self.submitted.lock().unwrap().push(order.clone());
            Ok(ContingentOrderId::new("gtt-1"))
        }

        async fn get_balance(&self, _ctx: &ExecutionContext) -> Result<Decimal, BrokerError> {
            Ok(dec!(100000))
        }
    }

    fn ctx() -> ExecutionContext {
        ExecutionContext::new(CorrelationId::new("batch-1"), SessionCredential::new("token"))
    }

    fn plan() -> TradePlan {
        TradePlan {
            symbol: Symbol::new("HDFCBANK"),
            quantity: 10,
            entry_price: dec!(100),
            stop_loss: dec!(95),
            target_price: dec!(115),
            risk_percent: dec!(1),
            correlation_id: CorrelationId::new("batch-1"),
        }
    }

    #[tokio::test]
    async fn submits_stop_then_target_sell_legs() {
        let broker = Arc::new(MockBroker::new(false));
        let placer = ContingentOrderPlacer::new(Arc::clone(&broker));

        let id = placer.place(&ctx(), &plan(), None).await.unwrap();
        assert_eq!(id.as_str(), "gtt-1");

        let submitted = broker.submitted.lock().unwrap();
        let order = &submitted[0];
        assert_eq!(order.trigger_values(), [dec!(95), dec!(115)]);
        assert_eq!(order.reference_price, dec!(100));
        let [stop, target] = order.legs();
        assert_eq!(stop.kind, LegKind::StopLoss);
        assert_eq!(target.kind, LegKind::Target);
        for leg in order.legs() {
            assert_eq!(leg.side, OrderSide::Sell);
            assert_eq!(leg.quantity, 10);
        }
    }

    #[tokio::test]
    async fn fill_price_becomes_reference() {
        let broker = Arc::new(MockBroker::new(false));
        let placer = ContingentOrderPlacer::new(Arc::clone(&broker));

        placer.place(&ctx(), &plan(), Some(dec!(100.35))).await.unwrap();
        assert_eq!(broker.submitted.lock().unwrap()[0].reference_price, dec!(100.35));
    }

    #[tokio::test]
    async fn broker_rejection_is_surfaced() {
        let placer = ContingentOrderPlacer::new(Arc::new(MockBroker::new(true)));
        let err = placer.place(&ctx(), &plan(), None).await.unwrap_err();
        assert!(matches!(err, PlacementError::Broker(BrokerError::OrderRejected { .. })));
    }

    #[tokio::test]
    async fn invalid_plan_never_reaches_broker() {
        let broker = Arc::new(MockBroker::new(false));
        let placer = ContingentOrderPlacer::new(Arc::clone(&broker));
        let mut bad = plan();
        bad.quantity = 0;

        let err = placer.place(&ctx(), &bad, None).await.unwrap_err();
        assert!(matches!(err, PlacementError::InvalidOrder(_)));
        assert!(broker.submitted.lock().unwrap().is_empty());
    }
}
