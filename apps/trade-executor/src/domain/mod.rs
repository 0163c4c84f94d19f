//! Domain Layer
//!
//! Core business logic with no I/O: market-hours gating, risk sizing,
//! exposure scaling, protective order packaging and the trade lifecycle
//! state machine.

pub mod market_hours;
pub mod position_sizing;
pub mod protection;
pub mod shared;
pub mod trade_lifecycle;
