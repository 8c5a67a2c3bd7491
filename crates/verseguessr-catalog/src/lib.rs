//! Verseguessr — reference catalog.
//!
//! Static-after-load data that bounds and validates every guess: version
//! names, per-version book names, and the chapter to verse-count table.

pub mod application;
pub mod domain;
