//! Verseguessr — game session engine.
//!
//! Owns the per-round state (`RoundSegment`), the screen flow, scoring, and
//! the `SessionStore` that ties a play session together. Network access goes
//! through the service traits in `verseguessr-core`.

pub mod application;
pub mod config;
pub mod domain;
