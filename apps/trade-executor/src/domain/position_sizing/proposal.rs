//! Trade proposals as returned by the recommendation engine.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::shared::{DomainError, Symbol};

/// A proposed long trade setup before sizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeProposal {
    /// Trading symbol.
    pub symbol: Symbol,
    /// Proposed entry price.
    pub entry_price: Decimal,
    /// Proposed stop-loss price.
    pub stop_loss: Decimal,
    /// Proposed target price.
    pub target_price: Decimal,
    /// Free-form rationale from the recommendation engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// A correction applied while normalizing a proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalAdjustment {
    /// Stop-loss was at or above entry; the two prices were swapped.
    SwappedEntryAndStop {
        /// Entry price as proposed.
        original_entry: Decimal,
        /// Stop-loss as proposed.
        original_stop: Decimal,
    },
    /// Target was at or below entry; reset to a 1:1 reward:risk target.
    ResetTarget {
        /// Target as proposed.
        original_target: Decimal,
        /// Replacement target.
        new_target: Decimal,
    },
}

/// A proposal that satisfies `stop_loss < entry < target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedProposal {
    /// The corrected proposal.
    pub proposal: TradeProposal,
    /// Corrections that were applied, in order.
    pub adjustments: Vec<ProposalAdjustment>,
}

impl TradeProposal {
    /// Establish `stop_loss < entry < target` for a long setup.
    ///
    /// # Errors
    ///
    /// Returns error if any price is non-positive, if entry equals
    /// stop-loss so no ordering can be recovered, or if the corrected
    /// prices still violate the long ordering.
    pub fn normalize(self) -> Result<NormalizedProposal, DomainError> {
        if self.entry_price <= Decimal::ZERO
            || self.stop_loss <= Decimal::ZERO
            || self.target_price <= Decimal::ZERO
        {
            return Err(DomainError::invalid_value(
                "price",
                format!(
                    "{}: all prices must be positive (entry={}, stop_loss={}, target={})",
                    self.symbol, self.entry_price, self.stop_loss, self.target_price
                ),
            ));
        }

        let mut proposal = self;
        let mut adjustments = Vec::new();

        if proposal.stop_loss == proposal.entry_price {
            return Err(DomainError::invalid_value(
                "stop_loss",
                format!("{}: stop-loss equals entry price", proposal.symbol),
            ));
        }

        if proposal.stop_loss > proposal.entry_price {
            adjustments.push(ProposalAdjustment::SwappedEntryAndStop {
                original_entry: proposal.entry_price,
                original_stop: proposal.stop_loss,
            });
            std::mem::swap(&mut proposal.entry_price, &mut proposal.stop_loss);
        }

        if proposal.target_price <= proposal.entry_price {
            let risk = proposal.entry_price - proposal.stop_loss;
            // Round up so sub-cent prices never land the target at or below entry.
            let new_target = (proposal.entry_price + risk)
                .round_dp_with_strategy(2, RoundingStrategy::AwayFromZero);
            adjustments.push(ProposalAdjustment::ResetTarget {
                original_target: proposal.target_price,
                new_target,
            });
            proposal.target_price = new_target;
        }

        proposal.check_ordering()?;

        Ok(NormalizedProposal {
            proposal,
            adjustments,
        })
    }

    fn check_ordering(&self) -> Result<(), DomainError> {
        if self.stop_loss < self.entry_price && self.entry_price < self.target_price {
            return Ok(());
        }
        Err(DomainError::BusinessRuleViolation {
            rule: "LONG_PRICE_ORDERING".to_string(),
            message: format!(
                "{}: expected stop_loss < entry < target after normalization, got {} / {} / {}",
                self.symbol, self.stop_loss, self.entry_price, self.target_price
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn proposal(entry: Decimal, stop: Decimal, target: Decimal) -> TradeProposal {
        TradeProposal {
            symbol: Symbol::new("SBIN"),
            entry_price: entry,
            stop_loss: stop,
            target_price: target,
            reasoning: None,
        }
    }

    #[test]
    fn well_formed_proposal_is_untouched() {
        let normalized = proposal(dec!(100), dec!(95), dec!(115)).normalize().unwrap();
        assert!(normalized.adjustments.is_empty());
        assert_eq!(normalized.proposal.entry_price, dec!(100));
    }

    #[test]
    fn inverted_entry_and_stop_are_swapped() {
        let normalized = proposal(dec!(95), dec!(100), dec!(115)).normalize().unwrap();
        assert_eq!(normalized.proposal.entry_price, dec!(100));
        assert_eq!(normalized.proposal.stop_loss, dec!(95));
        assert!(matches!(
            normalized.adjustments[0],
            ProposalAdjustment::SwappedEntryAndStop { .. }
        ));
    }

    #[test]
    fn low_target_is_reset_to_one_to_one() {
        let normalized = proposal(dec!(200), dec!(190.5), dec!(199)).normalize().unwrap();
        assert_eq!(normalized.proposal.target_price, dec!(209.5));
        assert_eq!(
            normalized.adjustments,
            vec![ProposalAdjustment::ResetTarget {
                original_target: dec!(199),
                new_target: dec!(209.5),
            }]
        );
    }

    #[test]
    fn swap_then_target_reset() {
        let normalized = proposal(dec!(90), dec!(100), dec!(95)).normalize().unwrap();
        assert_eq!(normalized.proposal.entry_price, dec!(100));
        assert_eq!(normalized.proposal.stop_loss, dec!(90));
        assert_eq!(normalized.proposal.target_price, dec!(110));
        assert_eq!(normalized.adjustments.len(), 2);
    }

    #[test]
    fn sub_cent_reset_target_stays_above_entry() {
        let normalized = proposal(dec!(100.004), dec!(100.003), dec!(99))
            .normalize()
            .unwrap();
        let p = &normalized.proposal;
        assert_eq!(p.target_price, dec!(100.01));
        assert!(p.stop_loss < p.entry_price && p.entry_price < p.target_price);
    }

    #[test]
    fn reset_target_rounds_up_to_the_cent() {
        let normalized = proposal(dec!(50.001), dec!(49.998), dec!(50))
            .normalize()
            .unwrap();
        // 50.001 + 0.003 = 50.004 -> 50.01
        assert_eq!(normalized.proposal.target_price, dec!(50.01));
    }

    #[test]
    fn ordering_check_rejects_target_at_entry() {
        let p = proposal(dec!(100), dec!(95), dec!(100));
        assert!(matches!(
            p.check_ordering(),
            Err(DomainError::BusinessRuleViolation { .. })
        ));
        assert!(proposal(dec!(100), dec!(95), dec!(100.01)).check_ordering().is_ok());
    }

    #[test]
    fn non_positive_prices_are_rejected() {
        assert!(proposal(dec!(0), dec!(95), dec!(115)).normalize().is_err());
        assert!(proposal(dec!(100), dec!(-1), dec!(115)).normalize().is_err());
    }

    #[test]
    fn equal_entry_and_stop_is_rejected() {
        assert!(proposal(dec!(100), dec!(100), dec!(115)).normalize().is_err());
    }
}
