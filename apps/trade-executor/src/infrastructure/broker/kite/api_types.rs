//! Kite Connect request and response types.
//!
//! Every response is wrapped in a `{status, data, message, error_type}`
//! envelope. Requests are form-encoded; GTT `condition` and `orders` are
//! JSON documents carried inside form fields.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::application::ports::{BrokerOrderStatus, OrderStatusReport};
use crate::domain::protection::{ContingentLeg, ContingentOrder};
use crate::domain::shared::BrokerOrderId;

// ============================================================================
// Envelope
// ============================================================================

/// Response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct KiteEnvelope<T> {
    /// `success` or `error`.
    pub status: String,
    /// Payload on success.
    pub data: Option<T>,
    /// Error message.
    #[serde(default)]
    pub message: Option<String>,
    /// Exception class on error.
    #[serde(default)]
    pub error_type: Option<String>,
}

// ============================================================================
// Orders
// ============================================================================

/// Payload of `POST /orders/regular`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderIdData {
    /// Broker order id.
    pub order_id: String,
}

/// One entry of `GET /orders/{id}` (the order's history, oldest first).
#[derive(Debug, Clone, Deserialize)]
pub struct KiteOrderHistoryEntry {
    /// Broker order id.
    pub order_id: String,
    /// Raw status, e.g. `OPEN`, `COMPLETE`, `TRIGGER PENDING`.
    pub status: String,
    /// Average fill price; 0 until something fills.
    #[serde(default)]
    pub average_price: Option<Decimal>,
    /// Filled quantity.
    #[serde(default)]
    pub filled_quantity: Option<u64>,
    /// Rejection or cancellation detail.
    #[serde(default)]
    pub status_message: Option<String>,
}

impl KiteOrderHistoryEntry {
    /// Convert to the port's status report.
    pub fn to_status_report(&self) -> OrderStatusReport {
        OrderStatusReport {
            order_id: BrokerOrderId::new(self.order_id.clone()),
            status: BrokerOrderStatus::from_broker(&self.status),
            average_price: self.average_price.filter(|p| *p > Decimal::ZERO),
            filled_quantity: self.filled_quantity.unwrap_or(0),
            status_message: self.status_message.clone(),
        }
    }
}

/// Form fields for a market buy.
#[derive(Debug, Clone, Serialize)]
pub struct KiteMarketOrderForm {
    /// Symbol.
    pub tradingsymbol: String,
    /// Exchange.
    pub exchange: String,
    /// `BUY`.
    pub transaction_type: &'static str,
    /// `MARKET`.
    pub order_type: &'static str,
    /// Shares.
    pub quantity: u64,
    /// Product type, e.g. `CNC`.
    pub product: String,
    /// `DAY`.
    pub validity: &'static str,
    /// Short alphanumeric tag for reconciliation.
    pub tag: String,
}

// ============================================================================
// GTT
// ============================================================================

/// Form fields for `POST /gtt/triggers`.
#[derive(Debug, Clone, Serialize)]
pub struct KiteGttForm {
    /// `two-leg`.
    #[serde(rename = "type")]
    pub trigger_type: &'static str,
    /// JSON-encoded [`GttCondition`].
    pub condition: String,
    /// JSON-encoded list of [`GttOrder`].
    pub orders: String,
}

/// Trigger condition of a GTT.
#[derive(Debug, Clone, Serialize)]
pub struct GttCondition {
    /// Exchange.
    pub exchange: String,
    /// Symbol.
    pub tradingsymbol: String,
    /// `[stop_loss, target]`.
    pub trigger_values: Vec<f64>,
    /// Reference price the triggers are evaluated against.
    pub last_price: f64,
}

/// One leg order of a GTT.
#[derive(Debug, Clone, Serialize)]
pub struct GttOrder {
    /// Exchange.
    pub exchange: String,
    /// Symbol.
    pub tradingsymbol: String,
    /// `SELL` for long exits.
    pub transaction_type: String,
    /// Shares.
    pub quantity: u64,
    /// `LIMIT`.
    pub order_type: &'static str,
    /// Product type.
    pub product: String,
    /// Limit price.
    pub price: f64,
}

/// Payload of `POST /gtt/triggers`.
#[derive(Debug, Clone, Deserialize)]
pub struct GttTriggerData {
    /// Trigger id.
    pub trigger_id: u64,
}

fn wire_price(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

impl KiteGttForm {
    /// Encode a contingent order as a two-leg GTT.
    pub fn two_leg(
        order: &ContingentOrder,
        exchange: &str,
        product: &str,
    ) -> Result<Self, serde_json::Error> {
        let condition = GttCondition {
            exchange: exchange.to_string(),
            tradingsymbol: order.symbol.as_str().to_string(),
            trigger_values: order.trigger_values().into_iter().map(wire_price).collect(),
            last_price: wire_price(order.reference_price),
        };

        let leg_order = |leg: &ContingentLeg| GttOrder {
            exchange: exchange.to_string(),
            tradingsymbol: order.symbol.as_str().to_string(),
            transaction_type: leg.side.as_str().to_string(),
            quantity: leg.quantity,
            order_type: "LIMIT",
            product: product.to_string(),
            price: wire_price(leg.limit_price),
        };
        let orders: Vec<GttOrder> = order.legs().into_iter().map(leg_order).collect();

        Ok(Self {
            trigger_type: "two-leg",
            condition: serde_json::to_string(&condition)?,
            orders: serde_json::to_string(&orders)?,
        })
    }
}

// ============================================================================
// Margins
// ============================================================================

/// Payload of `GET /user/margins`.
#[derive(Debug, Clone, Deserialize)]
pub struct KiteMargins {
    /// Equity segment.
    #[serde(default)]
    pub equity: Option<KiteSegmentMargin>,
}

/// Margins of one segment.
#[derive(Debug, Clone, Deserialize)]
pub struct KiteSegmentMargin {
    /// Net cash available.
    pub net: Decimal,
}
