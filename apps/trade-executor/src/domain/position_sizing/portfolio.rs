//! Aggregate figures for a sized batch.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::plan::SizedPlan;

/// Portfolio-level totals shown before confirmation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    /// Number of plans.
    pub plan_count: usize,
    /// Sum of `investment_needed`.
    pub total_investment: Decimal,
    /// Sum of `risk_amount`.
    pub total_risk: Decimal,
    /// Sum of `potential_profit`.
    pub max_profit: Decimal,
    /// Sum of `potential_loss`, the loss if every stop-loss is hit.
    pub max_loss: Decimal,
    /// Balance the batch was sized against.
    pub available_balance: Decimal,
    /// `total_investment / balance` as a percentage.
    pub capital_utilization_percent: Decimal,
}

impl PortfolioMetrics {
    /// Aggregate a batch against the available balance.
    pub fn from_plans<'a>(plans: impl IntoIterator<Item = &'a SizedPlan>, balance: Decimal) -> Self {
        let mut metrics = plans.into_iter().fold(Self::default(), |mut acc, p| {
            acc.plan_count += 1;
            acc.total_investment += p.investment_needed;
            acc.total_risk += p.risk_amount;
            acc.max_profit += p.potential_profit;
            acc.max_loss += p.potential_loss();
            acc
        });

        metrics.available_balance = balance;
        if balance > Decimal::ZERO {
            metrics.capital_utilization_percent =
                (metrics.total_investment / balance * Decimal::ONE_HUNDRED).round_dp(2);
        }
        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position_sizing::TradePlan;
    use crate::domain::shared::{CorrelationId, Symbol};
    use rust_decimal_macros::dec;

    fn sized(qty: u64, entry: Decimal, stop: Decimal, target: Decimal) -> SizedPlan {
        SizedPlan::new(TradePlan {
            symbol: Symbol::new("X"),
            quantity: qty,
            entry_price: entry,
            stop_loss: stop,
            target_price: target,
            risk_percent: dec!(1),
            correlation_id: CorrelationId::new("b"),
        })
    }

    #[test]
    fn aggregates_batch() {
        let plans = [
            sized(10, dec!(100), dec!(95), dec!(115)),
            sized(20, dec!(50), dec!(48), dec!(56)),
        ];
        let metrics = PortfolioMetrics::from_plans(&plans, dec!(8000));

        assert_eq!(metrics.plan_count, 2);
        assert_eq!(metrics.total_investment, dec!(2000));
        assert_eq!(metrics.total_risk, dec!(90));
        assert_eq!(metrics.max_profit, dec!(270));
        assert_eq!(metrics.max_loss, dec!(90));
        assert_eq!(metrics.available_balance, dec!(8000));
        assert_eq!(metrics.capital_utilization_percent, dec!(25));
    }

    #[test]
    fn empty_batch_is_zero() {
        let metrics = PortfolioMetrics::from_plans(std::iter::empty(), dec!(1000));
        assert_eq!(metrics.plan_count, 0);
        assert_eq!(metrics.total_investment, Decimal::ZERO);
        assert_eq!(metrics.capital_utilization_percent, Decimal::ZERO);
    }
}
