//! Shared test doubles and fixtures for the Verseguessr engine.

mod counter;
mod fixtures;
mod logging;
mod service;

pub use counter::{FailingGuessCounter, RecordingGuessCounter};
pub use fixtures::{genesis_window, kjv_catalog_payload, verse_payload};
pub use logging::init_test_tracing;
pub use service::{FailingVerseService, GatedVerseService, ScriptedVerseService};
