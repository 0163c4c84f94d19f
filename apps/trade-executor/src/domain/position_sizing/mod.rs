//! Position Sizing Bounded Context
//!
//! Turns recommended trade setups into share quantities:
//! - `TradeProposal::normalize` repairs or rejects malformed price setups
//! - `RiskSizer` sizes a plan from a risk budget
//! - `ExposureScaler` caps aggregate capital across a batch

mod exposure_scaler;
mod plan;
mod portfolio;
mod proposal;
mod risk_sizer;

pub use exposure_scaler::{DEFAULT_SAFETY_MARGIN, ExposureScaler, ScalingOutcome};
pub use plan::{SizedPlan, TradePlan};
pub use portfolio::PortfolioMetrics;
pub use proposal::{NormalizedProposal, ProposalAdjustment, TradeProposal};
pub use risk_sizer::RiskSizer;
