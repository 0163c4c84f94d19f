//! Trade Lifecycle Bounded Context
//!
//! One approved trade plan is driven from admission to a terminal phase:
//!
//! ```text
//! STARTED -> ORDER_PLACING -> ORDER_PLACED -> ORDER_MONITORING
//!     -> ORDER_FILLED -> GTT_PLACING -> GTT_PLACED -> COMPLETED
//!     |  ORDER_TIMEOUT | MARKET_CLOSED | FAILED
//! ```
//!
//! Every transition appends exactly one [`ExecutionEvent`] to the
//! [`ExecutionRecord`], in transition order.

mod errors;
mod event;
mod phase;
mod record;

pub use errors::{FailureKind, LifecycleError};
pub use event::ExecutionEvent;
pub use phase::{LifecyclePhase, LifecycleStateMachine};
pub use record::ExecutionRecord;
