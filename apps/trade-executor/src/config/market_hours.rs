//! Exchange trading window configuration.

use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::domain::market_hours::MarketHoursConfig;

/// Market hours as written in YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketHoursSection {
    /// Exchange label used in messages.
    #[serde(default = "default_exchange")]
    pub exchange: String,
    /// IANA time zone of the exchange.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Session open, `HH:MM` local.
    #[serde(default = "default_open")]
    pub open: String,
    /// Session close, `HH:MM` local.
    #[serde(default = "default_close")]
    pub close: String,
}

impl Default for MarketHoursSection {
    fn default() -> Self {
        Self {
            exchange: default_exchange(),
            timezone: default_timezone(),
            open: default_open(),
            close: default_close(),
        }
    }
}

impl MarketHoursSection {
    /// Parse into the gate configuration.
    pub fn to_market_hours_config(&self) -> Result<MarketHoursConfig, ConfigError> {
        let timezone: Tz = self.timezone.parse().map_err(|_| {
            ConfigError::ValidationError(format!(
                "market_hours.timezone is not a known time zone: {}",
                self.timezone
            ))
        })?;
        let open = parse_time("market_hours.open", &self.open)?;
        let close = parse_time("market_hours.close", &self.close)?;

        if open >= close {
            return Err(ConfigError::ValidationError(
                "market_hours.open must be before market_hours.close".to_string(),
            ));
        }

        Ok(MarketHoursConfig {
            exchange: self.exchange.clone(),
            timezone,
            open,
            close,
        })
    }
}

fn parse_time(field: &str, value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|e| {
        ConfigError::ValidationError(format!("{field} must be HH:MM, got '{value}': {e}"))
    })
}

fn default_exchange() -> String {
    "NSE".to_string()
}

fn default_timezone() -> String {
    "Asia/Kolkata".to_string()
}

fn default_open() -> String {
    "09:15".to_string()
}

fn default_close() -> String {
    "15:30".to_string()
}
