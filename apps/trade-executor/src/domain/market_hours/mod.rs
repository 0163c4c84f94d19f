//! Market Hours Bounded Context
//!
//! The hard precondition that no order may be submitted outside the
//! exchange's trading session. The gate is a pure function of wall-clock
//! time and is checked both at batch admission and immediately before
//! every broker submission.

mod gate;
mod session;

pub use gate::{MarketHoursConfig, MarketHoursGate};
pub use session::MarketSession;
