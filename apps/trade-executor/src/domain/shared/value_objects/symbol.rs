//! Symbol value object for exchange trading symbols.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::DomainError;

/// An exchange trading symbol (e.g. "RELIANCE", "TATAMOTORS", "M&M").
///
/// The symbol is normalized to uppercase with surrounding whitespace removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a new Symbol.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_uppercase())
    }

    /// Create a Symbol, rejecting empty values.
    ///
    /// # Errors
    ///
    /// Returns error if the symbol is empty after trimming.
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let symbol = Self::new(value);
        if symbol.0.is_empty() {
            return Err(DomainError::invalid_value("symbol", "symbol cannot be empty"));
        }
        Ok(symbol)
    }

    /// Get the symbol string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_is_normalized() {
        assert_eq!(Symbol::new("  infy ").as_str(), "INFY");
    }

    #[test]
    fn symbol_parse_rejects_empty() {
        assert!(Symbol::parse("   ").is_err());
        assert!(Symbol::parse("tcs").is_ok());
    }

    #[test]
    fn symbol_orders_lexically() {
        assert!(Symbol::new("HDFCBANK") < Symbol::new("INFY"));
    }
}
