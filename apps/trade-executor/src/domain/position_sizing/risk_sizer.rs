//! Risk-budget position sizing.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::plan::{SizedPlan, TradePlan};
use super::proposal::TradeProposal;
use crate::domain::shared::CorrelationId;

/// Sizes long positions so that hitting the stop-loss loses at most
/// `risk_percent` of capital.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskSizer;

impl RiskSizer {
    /// Share quantity for a long position.
    ///
    /// `floor(capital * risk_percent / 100 / (entry - stop_loss))`.
    ///
    /// Returns 0 when `entry <= stop_loss` (not computable for a long) and
    /// when the budget cannot cover a single share; an under-funded trade is
    /// never rounded up to one share.
    #[must_use]
    pub fn calculate_quantity(
        entry: Decimal,
        stop_loss: Decimal,
        risk_percent: Decimal,
        capital: Decimal,
    ) -> u64 {
        if entry <= stop_loss {
            return 0;
        }

        let risk_per_share = entry - stop_loss;
        let risk_budget = capital * risk_percent / Decimal::ONE_HUNDRED;

        let Some(raw) = risk_budget.checked_div(risk_per_share) else {
            return 0;
        };
        let shares = raw.floor();
        if shares <= Decimal::ZERO {
            return 0;
        }
        shares.to_u64().unwrap_or(u64::MAX)
    }

    /// Size a normalized proposal into a plan.
    ///
    /// Returns `None` when the computed quantity is 0.
    #[must_use]
    pub fn size(
        proposal: &TradeProposal,
        risk_percent: Decimal,
        capital: Decimal,
        correlation_id: &CorrelationId,
    ) -> Option<SizedPlan> {
        let quantity = Self::calculate_quantity(
            proposal.entry_price,
            proposal.stop_loss,
            risk_percent,
            capital,
        );

        tracing::debug!(
            symbol = %proposal.symbol,
            %capital,
            %risk_percent,
            risk_per_share = %(proposal.entry_price - proposal.stop_loss),
            quantity,
            "Risk sizing"
        );

        if quantity == 0 {
            return None;
        }

        Some(SizedPlan::new(TradePlan {
            symbol: proposal.symbol.clone(),
            quantity,
            entry_price: proposal.entry_price,
            stop_loss: proposal.stop_loss,
            target_price: proposal.target_price,
            risk_percent,
            correlation_id: correlation_id.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::Symbol;
    use rust_decimal_macros::dec;
    use test_case::test_case;

    #[test]
    fn sizes_from_risk_budget() {
        // budget 1000, risk/share 2
        let qty = RiskSizer::calculate_quantity(dec!(100), dec!(98), dec!(1), dec!(100000));
        assert_eq!(qty, 500);
    }

    #[test]
    fn floors_fractional_shares() {
        // budget 1000, risk/share 3 -> 333.33
        let qty = RiskSizer::calculate_quantity(dec!(100), dec!(97), dec!(1), dec!(100000));
        assert_eq!(qty, 333);
    }

    #[test_case(dec!(100), dec!(100) ; "entry equals stop")]
    #[test_case(dec!(95), dec!(100) ; "entry below stop")]
    #[test_case(dec!(0.05), dec!(250) ; "entry far below stop")]
    fn non_long_setups_size_to_zero(entry: Decimal, stop: Decimal) {
        assert_eq!(
            RiskSizer::calculate_quantity(entry, stop, dec!(1), dec!(100000)),
            0
        );
    }

    #[test]
    fn insufficient_budget_is_zero_not_one() {
        // budget 0.005, risk/share 0.01 -> 0.5 share
        let qty = RiskSizer::calculate_quantity(dec!(100), dec!(99.99), dec!(0.001), dec!(500));
        assert_eq!(qty, 0);
    }

    #[test]
    fn non_positive_capital_sizes_to_zero() {
        assert_eq!(
            RiskSizer::calculate_quantity(dec!(100), dec!(98), dec!(1), Decimal::ZERO),
            0
        );
        assert_eq!(
            RiskSizer::calculate_quantity(dec!(100), dec!(98), dec!(1), dec!(-5000)),
            0
        );
    }

    #[test]
    fn size_builds_sized_plan() {
        let proposal = TradeProposal {
            symbol: Symbol::new("LT"),
            entry_price: dec!(100),
            stop_loss: dec!(98),
            target_price: dec!(106),
            reasoning: None,
        };
        let sized = RiskSizer::size(
            &proposal,
            dec!(1),
            dec!(100000),
            &CorrelationId::new("batch-1"),
        )
        .unwrap();

        assert_eq!(sized.quantity(), 500);
        assert_eq!(sized.investment_needed, dec!(50000));
        assert_eq!(sized.risk_amount, dec!(1000));
        assert_eq!(sized.potential_profit, dec!(3000));
        assert_eq!(sized.plan.correlation_id.as_str(), "batch-1");
    }

    #[test]
    fn size_skips_zero_quantity() {
        let proposal = TradeProposal {
            symbol: Symbol::new("MRF"),
            entry_price: dec!(130000),
            stop_loss: dec!(120000),
            target_price: dec!(150000),
            reasoning: None,
        };
        assert!(
            RiskSizer::size(&proposal, dec!(1), dec!(50000), &CorrelationId::new("b")).is_none()
        );
    }
}
