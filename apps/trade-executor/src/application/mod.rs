//! Application Layer
//!
//! Orchestrates the domain through use cases:
//!
//! - **Ports**: Interfaces for the broker, observers, storage and time
//! - **Services**: Contingent protection placement
//! - **Use Cases**: Single trade lifecycle and batch execution
//! - **DTOs**: Prepared batches and status reports

pub mod dto;
pub mod ports;
pub mod services;
pub mod use_cases;

pub use dto::*;
pub use ports::*;
pub use services::*;
pub use use_cases::*;
