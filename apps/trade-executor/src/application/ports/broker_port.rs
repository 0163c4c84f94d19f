//! Broker Gateway Port (Driven Port)
//!
//! Interface for submitting orders and protective triggers to a broker.
//! Every call carries an [`ExecutionContext`] so concurrent lifecycles
//! never share ambient session state.

use std::fmt;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::protection::ContingentOrder;
use crate::domain::shared::{BrokerOrderId, ContingentOrderId, CorrelationId, Symbol};

/// Broker session token for one batch run.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredential {
    access_token: String,
}

impl SessionCredential {
    /// Wrap an access token.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    /// Raw token, for building request headers.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredential")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Per-call context threaded through every gateway request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    /// Batch the call belongs to.
    pub correlation_id: CorrelationId,
    /// Session credential.
    pub credential: SessionCredential,
}

impl ExecutionContext {
    /// Create a new context.
    #[must_use]
    pub const fn new(correlation_id: CorrelationId, credential: SessionCredential) -> Self {
        Self {
            correlation_id,
            credential,
        }
    }
}

/// Normalized broker order status.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BrokerOrderStatus {
    /// Working at the exchange.
    Open,
    /// Accepted by the broker but not yet working.
    Pending,
    /// Fully executed.
    Complete,
    /// Cancelled.
    Cancelled,
    /// Rejected.
    Rejected,
    /// Any status outside the known vocabulary.
    Unknown(String),
}

impl BrokerOrderStatus {
    /// Normalize a broker status string.
    #[must_use]
    pub fn from_broker(raw: &str) -> Self {
        let normalized = raw.trim().to_uppercase();
        match normalized.as_str() {
            "COMPLETE" | "COMPLETED" | "FILLED" => Self::Complete,
            "CANCELLED" | "CANCELED" => Self::Cancelled,
            "REJECTED" => Self::Rejected,
            "OPEN" | "TRIGGER PENDING" | "AMO REQ RECEIVED" | "MODIFIED" => Self::Open,
            "OPEN PENDING" | "VALIDATION PENDING" | "PUT ORDER REQ RECEIVED"
            | "MODIFY PENDING" | "MODIFY VALIDATION PENDING" | "CANCEL PENDING" => Self::Pending,
            _ => Self::Unknown(raw.trim().to_string()),
        }
    }

    /// Check if the status is final.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Cancelled | Self::Rejected)
    }
}

impl fmt::Display for BrokerOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => f.write_str("OPEN"),
            Self::Pending => f.write_str("PENDING"),
            Self::Complete => f.write_str("COMPLETE"),
            Self::Cancelled => f.write_str("CANCELLED"),
            Self::Rejected => f.write_str("REJECTED"),
            Self::Unknown(raw) => f.write_str(raw),
        }
    }
}

/// Status snapshot of a submitted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusReport {
    /// Broker order id.
    pub order_id: BrokerOrderId,
    /// Normalized status.
    pub status: BrokerOrderStatus,
    /// Average fill price, once any quantity has filled.
    pub average_price: Option<Decimal>,
    /// Filled quantity.
    pub filled_quantity: u64,
    /// Broker-supplied status detail (e.g. rejection reason).
    pub status_message: Option<String>,
}

/// Broker port error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BrokerError {
    /// Exchange rejected the request for trading-hours reasons.
    #[error("Market closed: {message}")]
    MarketClosed {
        /// Broker message.
        message: String,
    },

    /// Request rejected by the broker.
    #[error("Order rejected: {reason}")]
    OrderRejected {
        /// Rejection reason.
        reason: String,
    },

    /// Session token missing, expired or invalid.
    #[error("Broker authentication failed: {message}")]
    Authentication {
        /// Error details.
        message: String,
    },

    /// Network or transport failure.
    #[error("Broker connection error: {message}")]
    ConnectionError {
        /// Error details.
        message: String,
    },

    /// Order not found.
    #[error("Order not found: {order_id}")]
    OrderNotFound {
        /// The missing order id.
        order_id: String,
    },

    /// Rate limited.
    #[error("Rate limited by broker")]
    RateLimited,

    /// Unknown error.
    #[error("Broker error: {message}")]
    Unknown {
        /// Error details.
        message: String,
    },
}

impl BrokerError {
    /// Check if the error is the distinct market-hours rejection.
    #[must_use]
    pub const fn is_market_closed(&self) -> bool {
        matches!(self, Self::MarketClosed { .. })
    }
}

/// Port for broker interactions.
#[async_trait]
pub trait BrokerGateway: Send + Sync {
    /// Submit a market buy for delivery.
    ///
    /// Fails with [`BrokerError::MarketClosed`] when the exchange rejects
    /// for trading-hours reasons.
    async fn submit_market_buy(
        &self,
        ctx: &ExecutionContext,
        symbol: &Symbol,
        quantity: u64,
    ) -> Result<BrokerOrderId, BrokerError>;

    /// Latest status of an order.
    async fn get_order_status(
        &self,
        ctx: &ExecutionContext,
        order_id: &BrokerOrderId,
    ) -> Result<OrderStatusReport, BrokerError>;

    /// Submit a two-leg contingent exit order.
    async fn submit_contingent_order(
        &self,
        ctx: &ExecutionContext,
        order: &ContingentOrder,
    ) -> Result<ContingentOrderId, BrokerError>;

    /// Available cash balance for new positions.
    async fn get_balance(&self, ctx: &ExecutionContext) -> Result<Decimal, BrokerError>;
}
