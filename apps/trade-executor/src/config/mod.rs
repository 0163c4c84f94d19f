//! Configuration module for the trade executor.
//!
//! Loads `config.yaml`, interpolates environment variables and validates
//! every section before anything touches the broker.
//!
//! # Usage
//!
//! ```rust,ignore
//! use trade_executor::config::load_config;
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! let kite = config.broker.to_kite_config();
//! let gate = config.market_hours.to_market_hours_config()?;
//! ```

mod broker;
mod execution;
mod market_hours;
mod observability;
mod risk;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use broker::{BrokerConfig, BrokerRetryConfig};
pub use execution::ExecutionConfig;
pub use market_hours::MarketHoursSection;
pub use observability::ObservabilityConfig;
pub use risk::RiskConfig;

use crate::application::use_cases::BatchSettings;

/// Highest accepted per-plan risk percent.
const MAX_RISK_PERCENT: f64 = 5.0;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),

    /// Missing required environment variable.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Broker configuration.
    #[serde(default)]
    pub broker: BrokerConfig,
    /// Lifecycle timing and batch concurrency.
    #[serde(default)]
    pub execution: ExecutionConfig,
    /// Exchange trading window.
    #[serde(default)]
    pub market_hours: MarketHoursSection,
    /// Risk budget.
    #[serde(default)]
    pub risk: RiskConfig,
    /// Logging and metrics.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Batch settings derived from the execution and risk sections.
    pub fn batch_settings(&self) -> Result<BatchSettings, ConfigError> {
        Ok(BatchSettings {
            max_concurrent_plans: self.execution.max_concurrent_plans,
            default_risk_percent: self.risk.risk_percent()?,
            safety_margin: self.risk.safety_margin()?,
        })
    }

    /// Fail unless the broker API key is set.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        if self.broker.api_key.trim().is_empty() {
            return Err(ConfigError::MissingEnvVar("KITE_API_KEY".to_string()));
        }
        Ok(&self.broker.api_key)
    }
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or("config.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map(|m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.map_or_else(String::new, str::to_string),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let exec = &config.execution;
    if exec.poll_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "execution.poll_interval_ms must be positive".to_string(),
        ));
    }
    if exec.poll_interval_ms >= exec.fill_timeout_secs.saturating_mul(1000) {
        return Err(ConfigError::ValidationError(
            "execution.poll_interval_ms must be shorter than execution.fill_timeout_secs"
                .to_string(),
        ));
    }
    if exec.max_concurrent_plans == 0 {
        return Err(ConfigError::ValidationError(
            "execution.max_concurrent_plans must be at least 1".to_string(),
        ));
    }

    config.market_hours.to_market_hours_config()?;

    let risk = config.risk.risk_percent()?;
    if risk <= Decimal::ZERO || config.risk.default_risk_percent > MAX_RISK_PERCENT {
        return Err(ConfigError::ValidationError(format!(
            "risk.default_risk_percent must be in (0, {MAX_RISK_PERCENT}]"
        )));
    }

    let margin = config.risk.safety_margin()?;
    if margin <= Decimal::ZERO || margin > Decimal::ONE {
        return Err(ConfigError::ValidationError(
            "risk.exposure_safety_margin must be in (0, 1]".to_string(),
        ));
    }

    if config.broker.retry.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "broker.retry.max_attempts must be at least 1".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&config.broker.retry.jitter_factor) {
        return Err(ConfigError::ValidationError(
            "broker.retry.jitter_factor must be between 0.0 and 1.0".to_string(),
        ));
    }

    Ok(())
}
