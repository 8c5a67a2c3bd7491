//! Domain layer: synchronous game state and its invariants.

pub mod aggregation;
pub mod scoring;
pub mod screen;
pub mod segment;
pub mod store;
