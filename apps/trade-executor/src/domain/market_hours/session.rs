//! Market session classification.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a point in time falls relative to the exchange's trading window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketSession {
    /// Saturday or Sunday in exchange-local time.
    Weekend(Weekday),
    /// A weekday before the opening bell.
    PreOpen,
    /// Within the trading window (both bounds inclusive).
    Open,
    /// A weekday after the closing bell.
    PostClose,
}

impl MarketSession {
    /// Whether new broker submissions are allowed in this session.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}

impl fmt::Display for MarketSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weekend(day) => write!(f, "WEEKEND({day})"),
            Self::PreOpen => write!(f, "PRE_OPEN"),
            Self::Open => write!(f, "OPEN"),
            Self::PostClose => write!(f, "POST_CLOSE"),
        }
    }
}
