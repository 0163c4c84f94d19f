//! Aggregate exposure scaling.
//!
//! When a batch of individually sized plans needs more capital than the
//! account holds, every quantity is scaled by one common factor so the
//! batch fits inside a safety margin of the balance.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::plan::SizedPlan;
use crate::domain::shared::Symbol;

/// Fraction of the balance a scaled batch may consume.
pub const DEFAULT_SAFETY_MARGIN: Decimal = dec!(0.95);

/// Result of a scaling pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalingOutcome {
    /// Whether quantities were rewritten.
    pub scaled: bool,
    /// Factor applied, when scaled.
    pub factor: Option<Decimal>,
    /// Aggregate investment before scaling.
    pub total_before: Decimal,
    /// Aggregate investment after scaling.
    pub total_after: Decimal,
}

/// Scales a batch of sized plans down to fit the available balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExposureScaler {
    safety_margin: Decimal,
}

impl Default for ExposureScaler {
    fn default() -> Self {
        Self::new(DEFAULT_SAFETY_MARGIN)
    }
}

impl ExposureScaler {
    /// Create a scaler with the given safety margin (fraction of balance).
    #[must_use]
    pub const fn new(safety_margin: Decimal) -> Self {
        Self { safety_margin }
    }

    /// Configured safety margin.
    #[must_use]
    pub const fn safety_margin(&self) -> Decimal {
        self.safety_margin
    }

    /// Scale `plans` in place so the batch fits in `balance * safety_margin`.
    ///
    /// No-op when the aggregate investment is within `balance`. Otherwise a
    /// single factor `balance * safety_margin / total` is applied to every
    /// plan, quantities are floored and clamped to at least 1, and the
    /// derived amounts are recomputed. Runs exactly once; the clamp may leave
    /// the total slightly above the target.
    pub fn scale(&self, plans: &mut BTreeMap<Symbol, SizedPlan>, balance: Decimal) -> ScalingOutcome {
        let total_before = Self::total_investment(plans);

        if total_before <= balance || total_before <= Decimal::ZERO {
            return ScalingOutcome {
                scaled: false,
                factor: None,
                total_before,
                total_after: total_before,
            };
        }

        let factor = balance * self.safety_margin / total_before;

        for (symbol, sized) in plans.iter_mut() {
            let original = sized.quantity();
            let scaled = (Decimal::from(original) * factor)
                .floor()
                .to_u64()
                .unwrap_or(0)
                .max(1);
            sized.set_quantity(scaled);

            tracing::debug!(
                %symbol,
                original_quantity = original,
                scaled_quantity = scaled,
                "Scaled position"
            );
        }

        let total_after = Self::total_investment(plans);

        tracing::info!(
            %balance,
            %total_before,
            %total_after,
            %factor,
            "Scaled batch to fit available balance"
        );

        ScalingOutcome {
            scaled: true,
            factor: Some(factor),
            total_before,
            total_after,
        }
    }

    /// Sum of `investment_needed` across plans.
    #[must_use]
    pub fn total_investment(plans: &BTreeMap<Symbol, SizedPlan>) -> Decimal {
        plans.values().map(|p| p.investment_needed).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position_sizing::TradePlan;
    use crate::domain::shared::CorrelationId;
    use proptest::prelude::*;

    fn sized(symbol: &str, quantity: u64, entry: Decimal) -> (Symbol, SizedPlan) {
        let symbol = Symbol::new(symbol);
        let plan = TradePlan {
            symbol: symbol.clone(),
            quantity,
            entry_price: entry,
            stop_loss: entry - dec!(1),
            target_price: entry + dec!(2),
            risk_percent: dec!(1),
            correlation_id: CorrelationId::new("batch"),
        };
        (symbol, SizedPlan::new(plan))
    }

    #[test]
    fn within_balance_is_untouched() {
        let mut plans: BTreeMap<_, _> = [sized("A", 10, dec!(100)), sized("B", 5, dec!(200))]
            .into_iter()
            .collect();
        let outcome = ExposureScaler::default().scale(&mut plans, dec!(2000));

        assert!(!outcome.scaled);
        assert_eq!(outcome.total_after, dec!(2000));
        assert_eq!(plans[&Symbol::new("A")].quantity(), 10);
    }

    #[test]
    fn over_balance_scales_uniformly() {
        // total 20000, balance 10000 -> factor 0.475
        let mut plans: BTreeMap<_, _> = [sized("A", 100, dec!(100)), sized("B", 50, dec!(200))]
            .into_iter()
            .collect();
        let outcome = ExposureScaler::default().scale(&mut plans, dec!(10000));

        assert!(outcome.scaled);
        assert_eq!(outcome.factor, Some(dec!(0.475)));
        assert_eq!(plans[&Symbol::new("A")].quantity(), 47);
        assert_eq!(plans[&Symbol::new("B")].quantity(), 23);
        assert_eq!(plans[&Symbol::new("A")].investment_needed, dec!(4700));
        assert_eq!(plans[&Symbol::new("B")].risk_amount, dec!(23));
        assert_eq!(outcome.total_after, dec!(9300));
    }

    #[test]
    fn tiny_factor_clamps_to_one_share() {
        let mut plans: BTreeMap<_, _> = [sized("A", 10, dec!(1000))].into_iter().collect();
        let outcome = ExposureScaler::default().scale(&mut plans, dec!(500));

        assert!(outcome.scaled);
        assert_eq!(plans[&Symbol::new("A")].quantity(), 1);
        // clamp leaves the batch above the balance
        assert_eq!(outcome.total_after, dec!(1000));
    }

    #[test]
    fn custom_margin_is_respected() {
        let mut plans: BTreeMap<_, _> = [sized("A", 100, dec!(100))].into_iter().collect();
        ExposureScaler::new(dec!(0.5)).scale(&mut plans, dec!(5000));
        assert_eq!(plans[&Symbol::new("A")].quantity(), 25);
    }

    proptest! {
        #[test]
        fn scaled_total_is_bounded(
            entries in prop::collection::vec((1u64..5_000, 1i64..500_000), 1..8),
            balance_units in 1_000i64..1_000_000,
        ) {
            let mut plans = BTreeMap::new();
            for (i, (qty, cents)) in entries.iter().enumerate() {
                let (symbol, plan) = sized(&format!("S{i}"), *qty, Decimal::new(*cents, 2));
                plans.insert(symbol, plan);
            }
            let balance = Decimal::from(balance_units);
            let total_before = ExposureScaler::total_investment(&plans);

            let outcome = ExposureScaler::default().scale(&mut plans, balance);

            prop_assert!(plans.values().all(|p| p.quantity() >= 1));
            if total_before > balance {
                prop_assert!(outcome.scaled);
                let clamp_slack: Decimal = plans
                    .values()
                    .filter(|p| p.quantity() == 1)
                    .map(|p| p.plan.entry_price)
                    .sum();
                prop_assert!(outcome.total_after <= balance * DEFAULT_SAFETY_MARGIN + clamp_slack);
            } else {
                prop_assert_eq!(outcome.total_after, total_before);
            }
        }
    }
}
