//! Kite broker adapter implementing `BrokerGateway`.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::application::ports::{
    BrokerError, BrokerGateway, ExecutionContext, OrderStatusReport,
};
use crate::domain::protection::ContingentOrder;
use crate::domain::shared::{BrokerOrderId, ContingentOrderId, CorrelationId, OrderSide, Symbol};

use super::api_types::{
    GttTriggerData, KiteGttForm, KiteMargins, KiteMarketOrderForm, KiteOrderHistoryEntry,
    OrderIdData,
};
use super::config::KiteConfig;
use super::error::KiteError;
use super::http_client::KiteHttpClient;

/// Longest order tag Kite accepts.
const MAX_TAG_LEN: usize = 20;

/// Kite Connect broker adapter.
#[derive(Debug, Clone)]
pub struct KiteBrokerAdapter {
    client: KiteHttpClient,
    exchange: String,
    product: String,
}

impl KiteBrokerAdapter {
    /// Create a new Kite broker adapter.
    pub fn new(config: KiteConfig) -> Result<Self, KiteError> {
        let client = KiteHttpClient::new(&config)?;
        Ok(Self {
            client,
            exchange: config.exchange,
            product: config.product,
        })
    }

    /// Alphanumeric order tag derived from the correlation id.
    fn order_tag(correlation_id: &CorrelationId) -> String {
        correlation_id
            .as_str()
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .take(MAX_TAG_LEN)
            .collect()
    }
}

#[async_trait]
impl BrokerGateway for KiteBrokerAdapter {
    async fn submit_market_buy(
        &self,
        ctx: &ExecutionContext,
        symbol: &Symbol,
        quantity: u64,
    ) -> Result<BrokerOrderId, BrokerError> {
        let form = KiteMarketOrderForm {
            tradingsymbol: symbol.as_str().to_string(),
            exchange: self.exchange.clone(),
            transaction_type: OrderSide::Buy.as_str(),
            order_type: "MARKET",
            quantity,
            product: self.product.clone(),
            validity: "DAY",
            tag: Self::order_tag(&ctx.correlation_id),
        };

        tracing::info!(
            correlation_id = %ctx.correlation_id,
            %symbol,
            quantity,
            exchange = %self.exchange,
            product = %self.product,
            "Submitting market BUY to Kite"
        );

        let data: OrderIdData = self
            .client
            .post_form(ctx, "/orders/regular", &form)
            .await
            .map_err(BrokerError::from)?;

        tracing::info!(
            correlation_id = %ctx.correlation_id,
            %symbol,
            order_id = %data.order_id,
            "Order accepted"
        );

        Ok(BrokerOrderId::new(data.order_id))
    }

    async fn get_order_status(
        &self,
        ctx: &ExecutionContext,
        order_id: &BrokerOrderId,
    ) -> Result<OrderStatusReport, BrokerError> {
        let history: Vec<KiteOrderHistoryEntry> = self
            .client
            .get(ctx, &format!("/orders/{}", order_id.as_str()))
            .await
            .map_err(BrokerError::from)?;

        history
            .last()
            .map(KiteOrderHistoryEntry::to_status_report)
            .ok_or_else(|| BrokerError::OrderNotFound {
                order_id: order_id.to_string(),
            })
    }

    async fn submit_contingent_order(
        &self,
        ctx: &ExecutionContext,
        order: &ContingentOrder,
    ) -> Result<ContingentOrderId, BrokerError> {
        let form = KiteGttForm::two_leg(order, &self.exchange, &self.product).map_err(|e| {
            BrokerError::Unknown {
                message: format!("Failed to encode GTT: {e}"),
            }
        })?;

        let data: GttTriggerData = self
            .client
            .post_form(ctx, "/gtt/triggers", &form)
            .await
            .map_err(BrokerError::from)?;

        tracing::info!(
            correlation_id = %ctx.correlation_id,
            symbol = %order.symbol,
            trigger_id = data.trigger_id,
            "GTT trigger placed"
        );

        Ok(ContingentOrderId::new(data.trigger_id.to_string()))
    }

    async fn get_balance(&self, ctx: &ExecutionContext) -> Result<Decimal, BrokerError> {
        let margins: KiteMargins = self
            .client
            .get(ctx, "/user/margins")
            .await
            .map_err(BrokerError::from)?;

        margins
            .equity
            .map(|segment| segment.net)
            .ok_or_else(|| BrokerError::Unknown {
                message: "Margins response has no equity segment".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_tag_is_alphanumeric_and_bounded() {
        let tag = KiteBrokerAdapter::order_tag(&CorrelationId::new(
            "3f2a9c1e-8b7d-4e6f-a5c4-1b2d3e4f5a6b",
        ));
        assert_eq!(tag.len(), MAX_TAG_LEN);
        assert!(tag.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(tag.starts_with("3f2a9c1e8b7d"));
    }

    #[test]
    fn adapter_requires_api_key() {
        assert!(KiteBrokerAdapter::new(KiteConfig::new("")).is_err());
        assert!(KiteBrokerAdapter::new(KiteConfig::new("kite-key")).is_ok());
    }
}
