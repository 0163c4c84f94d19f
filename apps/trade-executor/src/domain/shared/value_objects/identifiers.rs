//! Strongly-typed identifiers.
//!
//! These prevent mixing up a broker order id with a GTT trigger id or a
//! batch correlation id.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from a string.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the inner string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

define_id!(
    CorrelationId,
    "Identifier tying a batch of trade plans, their lifecycle events and durable log entries together."
);
define_id!(BrokerOrderId, "Broker's identifier for a submitted order.");
define_id!(
    ContingentOrderId,
    "Broker's identifier for a placed contingent (GTT/OCO) trigger."
);

impl CorrelationId {
    /// Generate a new unique correlation id using UUID v4.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correlation_id_generate_is_unique() {
        assert_ne!(CorrelationId::generate(), CorrelationId::generate());
    }

    #[test]
    fn broker_order_id_from_str_and_display() {
        let id: BrokerOrderId = "220303000308932".into();
        assert_eq!(id.as_str(), "220303000308932");
        assert_eq!(format!("{id}"), "220303000308932");
    }

    #[test]
    fn contingent_order_id_serde_is_transparent() {
        let id = ContingentOrderId::new("123456");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"123456\"");
    }
}
