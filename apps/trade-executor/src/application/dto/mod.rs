//! Data Transfer Objects
//!
//! Shapes exchanged with callers of the batch use case.

mod batch_dto;

pub use batch_dto::{
    BatchStatusReport, PlanOutcome, PreparedBatch, ProposalNote, QuantityOverride,
};
