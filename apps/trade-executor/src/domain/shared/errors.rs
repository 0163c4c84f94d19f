//! Domain errors for the trade executor.

use std::fmt;

/// Domain-level errors that can occur in business logic.
///
/// These errors are independent of infrastructure concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid state transition attempted.
    InvalidStateTransition {
        /// Entity type (e.g., "TradeLifecycle").
        entity: String,
        /// Current state.
        from: String,
        /// Attempted state.
        to: String,
        /// States reachable from `from`; empty when `from` is terminal.
        allowed: Vec<String>,
    },

    /// Invalid value for a field.
    InvalidValue {
        /// Field name.
        field: String,
        /// Error message.
        message: String,
    },

    /// Business rule violation.
    BusinessRuleViolation {
        /// Rule name or code.
        rule: String,
        /// Description of the violation.
        message: String,
    },
}

impl DomainError {
    /// Shorthand for an [`DomainError::InvalidValue`].
    #[must_use]
    pub fn invalid_value(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStateTransition {
                entity,
                from,
                to,
                allowed,
            } => {
                write!(f, "Invalid state transition for {entity}: {from} -> {to}")?;
                if allowed.is_empty() {
                    write!(f, " ({from} is terminal)")
                } else {
                    write!(f, " (allowed: {})", allowed.join(", "))
                }
            }
            Self::InvalidValue { field, message } => {
                write!(f, "Invalid value for '{field}': {message}")
            }
            Self::BusinessRuleViolation { rule, message } => {
                write!(f, "Business rule '{rule}' violated: {message}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
