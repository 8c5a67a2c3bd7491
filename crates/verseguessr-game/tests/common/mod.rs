//! Shared helpers for session integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use verseguessr_core::service::{GuessCounter, VerseService};
use verseguessr_game::config::GameConfig;
use verseguessr_game::domain::segment::LoadState;
use verseguessr_game::domain::store::SessionStore;
use verseguessr_test_support::{
    RecordingGuessCounter, ScriptedVerseService, genesis_window, init_test_tracing,
    kjv_catalog_payload,
};

/// KJV defaults with a radius of 2, matching the fixture windows.
pub fn kjv_config() -> GameConfig {
    GameConfig {
        default_version: "KJV".to_owned(),
        default_context_radius: 2,
        ..GameConfig::default()
    }
}

/// A scripted service whose every round targets Genesis 1:5 between
/// verses 3..=7.
pub fn scripted_service() -> ScriptedVerseService {
    ScriptedVerseService::new(kjv_catalog_payload()).with_contexts(vec![genesis_window(3, 5, 2)])
}

/// Builds a store with tracing initialised.
pub fn build_store(
    config: GameConfig,
    service: Arc<dyn VerseService>,
    counter: Arc<dyn GuessCounter>,
) -> SessionStore {
    init_test_tracing();
    SessionStore::new(config, service, counter)
}

/// Builds a KJV store over `service` with an in-memory counter.
pub fn kjv_store(service: Arc<dyn VerseService>) -> SessionStore {
    build_store(kjv_config(), service, Arc::new(RecordingGuessCounter::default()))
}

/// Loads the catalog and enters `Playing`, waiting for the first round.
///
/// # Panics
///
/// Panics if the catalog or the round fails to load.
pub async fn enter_playing(store: &SessionStore) {
    assert!(store.load_catalog().await, "catalog should load");
    let load = store
        .next_screen()
        .and_then(|transition| transition.pending_load)
        .expect("settings -> playing should start a load");
    assert_eq!(load.await.unwrap(), LoadState::Ready);
}

/// Asserts the store-level invariant of the `Playing` screen.
pub fn assert_active_not_finalized(store: &SessionStore) {
    let active = store.active_segment();
    assert!(
        !store
            .finalized_segments()
            .iter()
            .any(|done| done.same_instance(&active)),
        "active round must not be finalized while playing"
    );
}
