//! Verseguessr Core — shared abstractions for the game session engine.
//!
//! This crate defines the change notifier, the verse value type, the
//! external service contracts, and wire payloads. It contains no game
//! logic and no transport code.

pub mod error;
pub mod notifier;
pub mod service;
pub mod verse;
pub mod wire;
