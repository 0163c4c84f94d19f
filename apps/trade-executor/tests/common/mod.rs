//! Shared test doubles for integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use trade_executor::application::ports::{
    BrokerError, BrokerGateway, BrokerOrderStatus, ExecutionContext, ExecutionObserver,
    OrderStatusReport, SessionCredential,
};
use trade_executor::domain::protection::ContingentOrder;
use trade_executor::domain::shared::{BrokerOrderId, ContingentOrderId, CorrelationId, Symbol};
use trade_executor::domain::trade_lifecycle::ExecutionEvent;

// =============================================================================
// Clock helpers
// =============================================================================

/// Monday 2026-10-19 10:00 IST.
pub fn market_open_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 4, 30, 0).unwrap()
}

/// Saturday 2026-10-17 11:00 IST.
pub fn weekend_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 17, 5, 30, 0).unwrap()
}

/// Monday 2026-10-19 16:00 IST.
pub fn after_close_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 10, 30, 0).unwrap()
}

pub fn context(batch_id: &str) -> ExecutionContext {
    ExecutionContext::new(CorrelationId::new(batch_id), SessionCredential::new("token"))
}

pub fn report(order_id: &str, status: BrokerOrderStatus, price: Option<Decimal>) -> OrderStatusReport {
    OrderStatusReport {
        order_id: BrokerOrderId::new(order_id),
        status,
        average_price: price,
        filled_quantity: 0,
        status_message: None,
    }
}

// =============================================================================
// Scripted broker
// =============================================================================

/// Broker whose answers are scripted up front.
///
/// Status polls are served from a queue; once it drains, every further poll
/// answers `OPEN`.
pub struct ScriptedBroker {
    balance: Decimal,
    buy_error: Mutex<Option<BrokerError>>,
    contingent_error: Mutex<Option<BrokerError>>,
    statuses: Mutex<VecDeque<Result<BrokerOrderStatus, BrokerError>>>,
    fill_price: Mutex<Option<Decimal>>,
    next_id: AtomicUsize,
    pub buys: Mutex<Vec<(Symbol, u64)>>,
    pub contingent_orders: Mutex<Vec<ContingentOrder>>,
    pub status_calls: AtomicUsize,
    pub credentials_seen: Mutex<Vec<String>>,
}

impl ScriptedBroker {
    pub fn new(balance: Decimal) -> Self {
        Self {
            balance,
            buy_error: Mutex::new(None),
            contingent_error: Mutex::new(None),
            statuses: Mutex::new(VecDeque::new()),
            fill_price: Mutex::new(None),
            next_id: AtomicUsize::new(1),
            buys: Mutex::new(Vec::new()),
            contingent_orders: Mutex::new(Vec::new()),
            status_calls: AtomicUsize::new(0),
            credentials_seen: Mutex::new(Vec::new()),
        }
    }

    /// Broker that fills every order on the first poll.
    pub fn filling(balance: Decimal) -> Self {
        let broker = Self::new(balance);
        broker.always_fill();
        broker
    }

    pub fn fail_buy(self, err: BrokerError) -> Self {
        *self.buy_error.lock().unwrap() = Some(err);
        self
    }

    pub fn fail_contingent(self, err: BrokerError) -> Self {
        *self.contingent_error.lock().unwrap() = Some(err);
        self
    }

    pub fn with_fill_price(self, price: Decimal) -> Self {
        *self.fill_price.lock().unwrap() = Some(price);
        self
    }

    pub fn push_status(&self, status: Result<BrokerOrderStatus, BrokerError>) {
        self.statuses.lock().unwrap().push_back(status);
    }

    fn always_fill(&self) {
        // Enough COMPLETE answers for any batch in these tests.
        for _ in 0..64 {
            self.push_status(Ok(BrokerOrderStatus::Complete));
        }
    }

    pub fn buy_count(&self) -> usize {
        self.buys.lock().unwrap().len()
    }

    pub fn contingent_count(&self) -> usize {
        self.contingent_orders.lock().unwrap().len()
    }

    pub fn status_call_count(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrokerGateway for ScriptedBroker {
    async fn submit_market_buy(
        &self,
        ctx: &ExecutionContext,
        symbol: &Symbol,
        quantity: u64,
    ) -> Result<BrokerOrderId, BrokerError> {
        self.credentials_seen
            .lock()
            .unwrap()
            .push(ctx.credential.access_token().to_string());
        if let Some(err) = self.buy_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.buys.lock().unwrap().push((symbol.clone(), quantity));
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(BrokerOrderId::new(format!("ORD-{id}")))
    }

    async fn get_order_status(
        &self,
        _ctx: &ExecutionContext,
        order_id: &BrokerOrderId,
    ) -> Result<OrderStatusReport, BrokerError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(BrokerOrderStatus::Open));
        let status = next?;
        let price = if status == BrokerOrderStatus::Complete {
            *self.fill_price.lock().unwrap()
        } else {
            None
        };
        Ok(report(order_id.as_str(), status, price))
    }

    async fn submit_contingent_order(
        &self,
        _ctx: &ExecutionContext,
        order: &ContingentOrder,
    ) -> Result<ContingentOrderId, BrokerError> {
        if let Some(err) = self.contingent_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.contingent_orders.lock().unwrap().push(order.clone());
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(ContingentOrderId::new(format!("GTT-{id}")))
    }

    async fn get_balance(&self, _ctx: &ExecutionContext) -> Result<Decimal, BrokerError> {
        Ok(self.balance)
    }
}

// =============================================================================
// Recording observer
// =============================================================================

#[derive(Default)]
pub struct RecordingObserver {
    pub events: Mutex<Vec<ExecutionEvent>>,
}

impl RecordingObserver {
    pub fn snapshot(&self) -> Vec<ExecutionEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExecutionObserver for RecordingObserver {
    async fn on_event(&self, event: ExecutionEvent) {
        self.events.lock().unwrap().push(event);
    }
}
