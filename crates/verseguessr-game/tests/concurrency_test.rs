//! Integration tests for late service responses and overlapping submissions.

mod common;

use std::sync::Arc;

use verseguessr_game::application::guess_handlers::GuessOutcome;
use verseguessr_game::domain::screen::ScreenState;
use verseguessr_game::domain::segment::LoadState;
use verseguessr_test_support::{
    GatedVerseService, ScriptedVerseService, genesis_window, kjv_catalog_payload,
};

fn gated() -> Arc<GatedVerseService> {
    Arc::new(GatedVerseService::new(
        ScriptedVerseService::new(kjv_catalog_payload()).with_contexts(vec![
            genesis_window(3, 5, 2),
            genesis_window(10, 5, 2),
        ]),
    ))
}

async fn wait_for_contexts(gate: &GatedVerseService, n: usize) {
    while gate.waiting_contexts() < n {
        tokio::task::yield_now().await;
    }
}

async fn wait_for_resolutions(gate: &GatedVerseService, n: usize) {
    while gate.waiting_resolutions() < n {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_late_context_lands_in_abandoned_round_only() {
    let gate = gated();
    let store = common::kjv_store(gate.clone());
    assert!(store.load_catalog().await);
    let pending = store.next_screen().unwrap().pending_load.unwrap();
    let abandoned = store.active_segment();
    wait_for_contexts(&gate, 1).await;

    store.previous_screen().unwrap();
    gate.release_contexts(1);
    let state = pending.await.unwrap();

    assert_eq!(state, LoadState::Ready);
    assert_eq!(abandoned.verse_to_guess().unwrap().verse_number(), 5);
    let active = store.active_segment();
    assert!(!active.same_instance(&abandoned));
    assert_eq!(active.load_state(), LoadState::Uninitialized);
    assert!(active.verse_to_guess().is_none());
    assert!(store.finalized_segments().is_empty());
    assert_eq!(store.screen_state(), ScreenState::Settings);
}

#[tokio::test]
async fn test_replayed_round_gets_its_own_window() {
    let gate = gated();
    let store = common::kjv_store(gate.clone());
    assert!(store.load_catalog().await);
    let stale = store.next_screen().unwrap().pending_load.unwrap();
    wait_for_contexts(&gate, 1).await;
    store.previous_screen().unwrap();
    let fresh = store.next_screen().unwrap().pending_load.unwrap();
    wait_for_contexts(&gate, 2).await;

    gate.release_contexts(2);
    stale.await.unwrap();
    fresh.await.unwrap();

    let target = store.active_segment().verse_to_guess().unwrap();
    assert_eq!(target.verse_number(), 12);
}

#[tokio::test]
async fn test_guess_resolving_across_abandon_is_superseded() {
    let gate = gated();
    gate.release_contexts(4);
    let store = common::kjv_store(gate.clone());
    common::enter_playing(&store).await;
    let round = store.active_segment();
    let submission = tokio::spawn({
        let store = store.clone();
        async move { store.submit_guess("Genesis", 1, 5).await }
    });
    wait_for_resolutions(&gate, 1).await;
    assert!(store.is_processing_guess());

    store.previous_screen().unwrap();
    assert!(!store.is_processing_guess());
    gate.release_resolutions(1);
    let outcome = submission.await.unwrap().unwrap();

    assert!(matches!(outcome, GuessOutcome::Superseded));
    assert_eq!(round.guess_count(), 0);
    assert!(!round.has_succeeded());
    assert!(store.finalized_segments().is_empty());
}

#[tokio::test]
async fn test_guess_resolving_across_skip_is_superseded() {
    let gate = gated();
    gate.release_contexts(4);
    let store = common::kjv_store(gate.clone());
    common::enter_playing(&store).await;
    let skipped = store.active_segment();
    let submission = tokio::spawn({
        let store = store.clone();
        async move { store.submit_guess("Genesis", 1, 1).await }
    });
    wait_for_resolutions(&gate, 1).await;

    let next_load = store.skip_round().unwrap();
    gate.release_resolutions(1);
    let outcome = submission.await.unwrap().unwrap();
    next_load.await.unwrap();

    assert!(matches!(outcome, GuessOutcome::Superseded));
    assert_eq!(skipped.guess_count(), 0);
    assert_eq!(store.active_segment().guess_count(), 0);
    assert!(store.finalized_segments()[0].same_instance(&skipped));
    common::assert_active_not_finalized(&store);
}

#[tokio::test]
async fn test_two_submissions_record_only_the_latest() {
    let gate = gated();
    gate.release_contexts(4);
    let store = common::kjv_store(gate.clone());
    common::enter_playing(&store).await;
    let spawn_guess = |verse: u32| {
        let store = store.clone();
        tokio::spawn(async move { store.submit_guess("Genesis", 1, verse).await })
    };
    let first = spawn_guess(5);
    wait_for_resolutions(&gate, 1).await;
    let second = spawn_guess(6);
    wait_for_resolutions(&gate, 2).await;

    gate.release_resolutions(2);
    let first = first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();

    assert!(matches!(first, GuessOutcome::Superseded));
    assert!(matches!(second, GuessOutcome::Incorrect { guess_count: 1 }));
    let round = store.active_segment();
    assert_eq!(round.guess_history()[0].verse_number(), 6);
    assert!(!round.has_succeeded());
    assert_eq!(store.round_number(), 1);
}
