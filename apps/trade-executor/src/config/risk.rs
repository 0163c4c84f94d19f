//! Risk budget configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Risk configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Percent of capital risked per plan when the batch does not say.
    #[serde(default = "default_risk_percent")]
    pub default_risk_percent: f64,
    /// Fraction of balance a scaled batch may consume.
    #[serde(default = "default_safety_margin")]
    pub exposure_safety_margin: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            default_risk_percent: default_risk_percent(),
            exposure_safety_margin: default_safety_margin(),
        }
    }
}

impl RiskConfig {
    /// Default risk percent as a decimal.
    pub fn risk_percent(&self) -> Result<Decimal, ConfigError> {
        to_decimal("risk.default_risk_percent", self.default_risk_percent)
    }

    /// Safety margin as a decimal.
    pub fn safety_margin(&self) -> Result<Decimal, ConfigError> {
        to_decimal("risk.exposure_safety_margin", self.exposure_safety_margin)
    }
}

fn to_decimal(field: &str, value: f64) -> Result<Decimal, ConfigError> {
    Decimal::try_from(value)
        .map(|d| d.normalize())
        .map_err(|e| ConfigError::ValidationError(format!("{field} is not a valid number: {e}")))
}

const fn default_risk_percent() -> f64 {
    1.0
}

const fn default_safety_margin() -> f64 {
    0.95
}
