//! Trade plans and their sized form.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{CorrelationId, DomainError, Symbol};

/// An approved long trade plan.
///
/// `stop_loss < entry_price < target_price` is established upstream by
/// normalization; the lifecycle orchestrator trusts it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradePlan {
    /// Trading symbol.
    pub symbol: Symbol,
    /// Shares to buy.
    pub quantity: u64,
    /// Entry price.
    pub entry_price: Decimal,
    /// Stop-loss price.
    pub stop_loss: Decimal,
    /// Target price.
    pub target_price: Decimal,
    /// Percent of capital risked if the stop-loss is hit.
    pub risk_percent: Decimal,
    /// Batch this plan belongs to.
    pub correlation_id: CorrelationId,
}

impl TradePlan {
    /// Check the long-side price ordering `stop_loss < entry < target`.
    ///
    /// # Errors
    ///
    /// Returns error describing the violated ordering.
    pub fn validate_price_ordering(&self) -> Result<(), DomainError> {
        if self.stop_loss < self.entry_price && self.entry_price < self.target_price {
            return Ok(());
        }
        Err(DomainError::BusinessRuleViolation {
            rule: "LONG_PRICE_ORDERING".to_string(),
            message: format!(
                "{}: expected stop_loss < entry < target, got {} / {} / {}",
                self.symbol, self.stop_loss, self.entry_price, self.target_price
            ),
        })
    }
}

/// A trade plan with the capital figures derived from its quantity.
///
/// Produced by the risk sizer; rewritten once by the exposure scaler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizedPlan {
    /// The plan; `plan.quantity` is the computed quantity.
    pub plan: TradePlan,
    /// `entry * quantity`.
    pub investment_needed: Decimal,
    /// `|entry - stop_loss| * quantity`.
    pub risk_amount: Decimal,
    /// `|target - entry| * quantity`.
    pub potential_profit: Decimal,
}

impl SizedPlan {
    /// Derive the capital figures for a plan.
    #[must_use]
    pub fn new(plan: TradePlan) -> Self {
        let mut sized = Self {
            plan,
            investment_needed: Decimal::ZERO,
            risk_amount: Decimal::ZERO,
            potential_profit: Decimal::ZERO,
        };
        sized.recompute();
        sized
    }

    /// Replace the quantity and recompute every derived amount.
    pub fn set_quantity(&mut self, quantity: u64) {
        self.plan.quantity = quantity;
        self.recompute();
    }

    /// Computed quantity.
    #[must_use]
    pub const fn quantity(&self) -> u64 {
        self.plan.quantity
    }

    /// Loss if the stop-loss is hit (same as `risk_amount`).
    #[must_use]
    pub const fn potential_loss(&self) -> Decimal {
        self.risk_amount
    }

    /// Reward per unit of risk, `(target - entry) / (entry - stop_loss)`.
    #[must_use]
    pub fn reward_risk_ratio(&self) -> Option<Decimal> {
        let risk = self.plan.entry_price - self.plan.stop_loss;
        if risk <= Decimal::ZERO {
            return None;
        }
        Some(((self.plan.target_price - self.plan.entry_price) / risk).round_dp(2))
    }

    fn recompute(&mut self) {
        let qty = Decimal::from(self.plan.quantity);
        self.investment_needed = self.plan.entry_price * qty;
        self.risk_amount = (self.plan.entry_price - self.plan.stop_loss).abs() * qty;
        self.potential_profit = (self.plan.target_price - self.plan.entry_price).abs() * qty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn plan(quantity: u64) -> TradePlan {
        TradePlan {
            symbol: Symbol::new("ITC"),
            quantity,
            entry_price: dec!(100),
            stop_loss: dec!(95),
            target_price: dec!(115),
            risk_percent: dec!(1),
            correlation_id: CorrelationId::new("batch-1"),
        }
    }

    #[test]
    fn sized_plan_derives_amounts() {
        let sized = SizedPlan::new(plan(10));
        assert_eq!(sized.investment_needed, dec!(1000));
        assert_eq!(sized.risk_amount, dec!(50));
        assert_eq!(sized.potential_profit, dec!(150));
        assert_eq!(sized.potential_loss(), dec!(50));
        assert_eq!(sized.reward_risk_ratio(), Some(dec!(3)));
    }

    #[test]
    fn set_quantity_recomputes() {
        let mut sized = SizedPlan::new(plan(10));
        sized.set_quantity(4);
        assert_eq!(sized.quantity(), 4);
        assert_eq!(sized.investment_needed, dec!(400));
        assert_eq!(sized.risk_amount, dec!(20));
        assert_eq!(sized.potential_profit, dec!(60));
    }

    #[test]
    fn price_ordering_validation() {
        assert!(plan(1).validate_price_ordering().is_ok());

        let mut bad = plan(1);
        bad.stop_loss = dec!(101);
        assert!(bad.validate_price_ordering().is_err());
    }
}
