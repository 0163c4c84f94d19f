//! Protection Bounded Context
//!
//! After an entry fills, the position is protected by a single
//! broker-side contingent order: a stop-loss leg and a target leg that
//! cancel each other when either triggers.

mod contingent_order;

pub use contingent_order::{ContingentLeg, ContingentOrder, ContingentOrderBuilder, LegKind};
