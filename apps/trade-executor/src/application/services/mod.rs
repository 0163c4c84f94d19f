//! Application Services

mod contingent_order_placer;

pub use contingent_order_placer::{ContingentOrderPlacer, PlacementError};
