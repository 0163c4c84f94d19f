//! Kite-specific error types.

use thiserror::Error;

use crate::application::ports::BrokerError;

/// Phrases Kite uses when rejecting orders outside trading hours.
const MARKET_CLOSED_PHRASES: &[&str] = &[
    "markets are closed",
    "market is closed",
    "outside market hours",
    "after market hours",
];

/// Check if a broker message is a trading-hours rejection.
#[must_use]
pub fn is_market_closed_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    MARKET_CLOSED_PHRASES.iter().any(|p| lower.contains(p))
}

/// Errors from the Kite adapter.
#[derive(Debug, Error, Clone)]
pub enum KiteError {
    /// HTTP client could not be built or the request was malformed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// API returned an error envelope.
    #[error("API error: {error_type} - {message}")]
    Api {
        /// Kite exception class, e.g. `InputException`.
        error_type: String,
        /// Error message from the API.
        message: String,
    },

    /// Exchange closed for trading.
    #[error("Market closed: {0}")]
    MarketClosed(String),

    /// Order or trigger was rejected.
    #[error("Order rejected: {0}")]
    OrderRejected(String),

    /// Missing or expired session.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Rate limited.
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Suggested retry delay in seconds.
        retry_after_secs: u64,
    },

    /// Network error (retryable for GETs).
    #[error("Network error: {0}")]
    Network(String),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    JsonParse(String),

    /// Max retries exceeded.
    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded {
        /// Number of attempts made before giving up.
        attempts: u32,
        /// Last failure seen.
        last_error: String,
    },

    /// Order not found.
    #[error("Order not found: {order_id}")]
    OrderNotFound {
        /// The order id that was not found.
        order_id: String,
    },

    /// Successful envelope without the expected payload.
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

impl KiteError {
    /// Classify an API error envelope.
    #[must_use]
    pub fn from_api(status: u16, error_type: Option<String>, message: String) -> Self {
        if is_market_closed_message(&message) {
            return Self::MarketClosed(message);
        }
        let error_type = error_type.unwrap_or_else(|| status.to_string());
        match (status, error_type.as_str()) {
            (401 | 403, _) | (_, "TokenException" | "PermissionException") => {
                Self::AuthenticationFailed(message)
            }
            (_, "OrderException" | "MarginException" | "InputException" | "HoldingException") => {
                Self::OrderRejected(message)
            }
            _ => Self::Api {
                error_type,
                message,
            },
        }
    }
}

impl From<KiteError> for BrokerError {
    fn from(err: KiteError) -> Self {
        match err {
            KiteError::Http(msg) | KiteError::Network(msg) | KiteError::JsonParse(msg) => {
                Self::ConnectionError { message: msg }
            }
            KiteError::Api {
                error_type,
                message,
            } => Self::Unknown {
                message: format!("{error_type}: {message}"),
            },
            KiteError::MarketClosed(message) => Self::MarketClosed { message },
            KiteError::OrderRejected(reason) => Self::OrderRejected { reason },
            KiteError::AuthenticationFailed(message) => Self::Authentication { message },
            KiteError::RateLimited { .. } => Self::RateLimited,
            KiteError::MaxRetriesExceeded {
                attempts,
                last_error,
            } => Self::ConnectionError {
                message: format!("Max retries exceeded after {attempts} attempts: {last_error}"),
            },
            KiteError::OrderNotFound { order_id } => Self::OrderNotFound { order_id },
            KiteError::InvalidResponse(message) => Self::Unknown { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Markets are closed right now. Use GTT for placing long standing orders instead." ; "kite wording")]
    #[test_case("Order placed outside market hours" ; "outside hours")]
    #[test_case("MARKET IS CLOSED" ; "upper case")]
    fn detects_market_closed(message: &str) {
        assert!(is_market_closed_message(message));
    }

    #[test]
    fn ordinary_rejection_is_not_market_closed() {
        assert!(!is_market_closed_message("Insufficient funds. Required margin is 95000"));
    }

    #[test]
    fn classifies_api_errors() {
        assert!(matches!(
            KiteError::from_api(400, Some("InputException".into()), "Markets are closed right now.".into()),
            KiteError::MarketClosed(_)
        ));
        assert!(matches!(
            KiteError::from_api(403, Some("TokenException".into()), "Incorrect api_key or access_token.".into()),
            KiteError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            KiteError::from_api(400, Some("MarginException".into()), "Insufficient funds".into()),
            KiteError::OrderRejected(_)
        ));
        assert!(matches!(
            KiteError::from_api(500, None, "boom".into()),
            KiteError::Api { .. }
        ));
    }

    #[test]
    fn kite_error_to_broker_error() {
        let closed: BrokerError = KiteError::MarketClosed("closed".into()).into();
        assert!(closed.is_market_closed());

        let auth: BrokerError = KiteError::AuthenticationFailed("expired".into()).into();
        assert!(matches!(auth, BrokerError::Authentication { .. }));

        let limited: BrokerError = KiteError::RateLimited { retry_after_secs: 1 }.into();
        assert!(matches!(limited, BrokerError::RateLimited));

        let missing: BrokerError = KiteError::OrderNotFound {
            order_id: "1".into(),
        }
        .into();
        assert!(matches!(missing, BrokerError::OrderNotFound { .. }));
    }
}
