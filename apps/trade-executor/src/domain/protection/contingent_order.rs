//! Contingent (one-cancels-other) exit order and builder.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{DomainError, OrderSide, Symbol};

/// Role of a contingent leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegKind {
    /// Exit below entry, limiting the loss.
    StopLoss,
    /// Exit above entry, taking profit.
    Target,
}

/// One exit leg of a contingent order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContingentLeg {
    /// Stop-loss or target.
    pub kind: LegKind,
    /// Always `Sell` for a long position.
    pub side: OrderSide,
    /// Shares to exit.
    pub quantity: u64,
    /// Trigger price, also used as the leg's limit price.
    pub limit_price: Decimal,
}

/// A broker-side contingent order protecting a filled long position.
///
/// Legs are tagged by kind; the broker's positional trigger list is
/// derived by [`ContingentOrder::trigger_values`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContingentOrder {
    /// Trading symbol.
    pub symbol: Symbol,
    /// Price the triggers are evaluated against (the fill price).
    pub reference_price: Decimal,
    stop_loss: ContingentLeg,
    target: ContingentLeg,
}

impl ContingentOrder {
    /// Stop-loss leg.
    #[must_use]
    pub const fn stop_loss_leg(&self) -> &ContingentLeg {
        &self.stop_loss
    }

    /// Target leg.
    #[must_use]
    pub const fn target_leg(&self) -> &ContingentLeg {
        &self.target
    }

    /// Legs in broker order: stop-loss first, then target.
    #[must_use]
    pub fn legs(&self) -> [&ContingentLeg; 2] {
        [&self.stop_loss, &self.target]
    }

    /// Trigger prices in broker order `[stop_loss, target]`.
    #[must_use]
    pub fn trigger_values(&self) -> [Decimal; 2] {
        [self.stop_loss.limit_price, self.target.limit_price]
    }

    /// Quantity protected by each leg.
    #[must_use]
    pub const fn quantity(&self) -> u64 {
        self.stop_loss.quantity
    }
}

/// Builder for [`ContingentOrder`].
#[derive(Debug, Default)]
pub struct ContingentOrderBuilder {
    symbol: Option<Symbol>,
    quantity: Option<u64>,
    reference_price: Option<Decimal>,
    stop_loss: Option<Decimal>,
    target: Option<Decimal>,
}

impl ContingentOrderBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the symbol.
    #[must_use]
    pub fn symbol(mut self, symbol: Symbol) -> Self {
        self.symbol = Some(symbol);
        self
    }

    /// Set the quantity to protect.
    #[must_use]
    pub const fn quantity(mut self, quantity: u64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Set the reference (fill) price.
    #[must_use]
    pub const fn reference_price(mut self, price: Decimal) -> Self {
        self.reference_price = Some(price);
        self
    }

    /// Set the stop-loss trigger.
    #[must_use]
    pub const fn stop_loss(mut self, price: Decimal) -> Self {
        self.stop_loss = Some(price);
        self
    }

    /// Set the target trigger.
    #[must_use]
    pub const fn target(mut self, price: Decimal) -> Self {
        self.target = Some(price);
        self
    }

    /// Build the contingent order.
    ///
    /// # Errors
    ///
    /// Returns error if a field is missing, the quantity is zero, or the
    /// stop-loss is not strictly below the target.
    pub fn build(self) -> Result<ContingentOrder, DomainError> {
        let symbol = self
            .symbol
            .ok_or_else(|| DomainError::invalid_value("symbol", "symbol required"))?;
        let quantity = self
            .quantity
            .ok_or_else(|| DomainError::invalid_value("quantity", "quantity required"))?;
        let reference_price = self.reference_price.ok_or_else(|| {
            DomainError::invalid_value("reference_price", "reference price required")
        })?;
        let stop_loss = self
            .stop_loss
            .ok_or_else(|| DomainError::invalid_value("stop_loss", "stop-loss required"))?;
        let target = self
            .target
            .ok_or_else(|| DomainError::invalid_value("target", "target required"))?;

        if quantity == 0 {
            return Err(DomainError::invalid_value(
                "quantity",
                "contingent order quantity must be positive",
            ));
        }
        if stop_loss >= target {
            return Err(DomainError::invalid_value(
                "stop_loss",
                format!("stop-loss {stop_loss} must be below target {target}"),
            ));
        }

        let leg = |kind, limit_price| ContingentLeg {
            kind,
            side: OrderSide::Sell,
            quantity,
            limit_price,
        };

        Ok(ContingentOrder {
            symbol,
            reference_price,
            stop_loss: leg(LegKind::StopLoss, stop_loss),
            target: leg(LegKind::Target, target),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn builder() -> ContingentOrderBuilder {
        ContingentOrderBuilder::new()
            .symbol(Symbol::new("INFY"))
            .quantity(10)
            .reference_price(dec!(100.5))
            .stop_loss(dec!(95))
            .target(dec!(115))
    }

    #[test]
    fn test_builds_two_sell_legs() {
        let order = match builder().build() {
            Ok(o) => o,
            Err(e) => panic!("should build contingent order: {e}"),
        };

        assert_eq!(order.trigger_values(), [dec!(95), dec!(115)]);
        assert_eq!(order.quantity(), 10);
        assert_eq!(order.reference_price, dec!(100.5));
        for leg in order.legs() {
            assert_eq!(leg.side, OrderSide::Sell);
            assert_eq!(leg.quantity, 10);
        }
        assert_eq!(order.stop_loss_leg().kind, LegKind::StopLoss);
        assert_eq!(order.target_leg().kind, LegKind::Target);
    }

    #[test]
    fn test_missing_fields() {
        assert!(ContingentOrderBuilder::new().symbol(Symbol::new("INFY")).build().is_err());
    }

    #[test]
    fn test_zero_quantity_rejected() {
        assert!(builder().quantity(0).build().is_err());
    }

    #[test]
    fn test_inverted_triggers_rejected() {
        assert!(builder().stop_loss(dec!(120)).build().is_err());
    }
}
