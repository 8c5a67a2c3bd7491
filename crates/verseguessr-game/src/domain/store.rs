//! The session store: screen flow, rounds, and the catalog of one play
//! session.
//!
//! `SessionStore` is a cheap-clone handle. All state sits behind one mutex
//! that is held only for synchronous mutations; listeners run after it is
//! released. When both locks are needed, the store lock is taken before a
//! segment lock.
//!
//! # Guess submissions
//!
//! Each guess submission takes a ticket from a generation counter. A
//! submission's result is applied only if its ticket is still the latest
//! when the verse service answers. Taking a new ticket, advancing the
//! round, or changing screens supersedes every outstanding ticket.
//!
//! [`SessionStore::is_processing_guess`] mirrors whether the latest ticket
//! is still in flight. It is advisory: nothing refuses a submission because
//! of it. UIs read it to show a busy cursor; correctness comes from the
//! tickets.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use verseguessr_catalog::domain::catalog::Catalog;
use verseguessr_core::notifier::{ChangeNotifier, Subscription};
use verseguessr_core::service::{GuessCounter, VerseService};

use super::scoring::{ScoringPolicy, StepPenaltyScoring};
use super::screen::{self, ScreenChange, ScreenEffect, ScreenEvent, ScreenState};
use super::segment::RoundSegment;
use crate::config::GameConfig;

#[derive(Debug)]
pub(crate) struct StoreState {
    pub(crate) catalog: Option<Arc<Catalog>>,
    pub(crate) catalog_attempts: u64,
    pub(crate) finalized: Vec<RoundSegment>,
    pub(crate) active: RoundSegment,
    pub(crate) screen: ScreenState,
    pub(crate) latest_ticket: u64,
    pub(crate) processing_guess: bool,
}

impl StoreState {
    /// Issues a new ticket, superseding all earlier ones.
    pub(crate) fn take_ticket(&mut self) -> u64 {
        self.latest_ticket += 1;
        self.processing_guess = true;
        self.latest_ticket
    }

    /// Supersedes outstanding tickets without starting a submission.
    pub(crate) fn supersede_tickets(&mut self) {
        self.latest_ticket += 1;
        self.processing_guess = false;
    }

    /// Finalizes the active segment and makes `next` active.
    ///
    /// Returns `false` without changes outside `Playing`, or when `next` is
    /// already the active or a finalized round.
    pub(crate) fn advance_round(&mut self, next: RoundSegment) -> bool {
        if self.screen != ScreenState::Playing {
            tracing::warn!(screen = ?self.screen, "start_next_round outside Playing, ignored");
            return false;
        }
        if next.same_instance(&self.active)
            || self.finalized.iter().any(|done| done.same_instance(&next))
        {
            tracing::warn!(round_id = %next.id(), "start_next_round with a known segment, ignored");
            return false;
        }
        let previous = std::mem::replace(&mut self.active, next);
        tracing::info!(
            finalized_round = %previous.id(),
            active_round = %self.active.id(),
            "round advanced"
        );
        self.finalized.push(previous);
        self.supersede_tickets();
        true
    }
}

pub(crate) struct StoreInner {
    pub(crate) state: Mutex<StoreState>,
    /// Serializes catalog fetches; held across the service call.
    pub(crate) catalog_gate: tokio::sync::Mutex<()>,
    pub(crate) notifier: ChangeNotifier,
    pub(crate) config: GameConfig,
    pub(crate) scoring: Arc<dyn ScoringPolicy>,
    pub(crate) service: Arc<dyn VerseService>,
    pub(crate) counter: Arc<dyn GuessCounter>,
}

/// Handle to one play session.
#[derive(Clone)]
pub struct SessionStore {
    pub(crate) inner: Arc<StoreInner>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &*self.lock())
            .field("config", &self.inner.config)
            .field("scoring", &self.inner.scoring.name())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Creates a store on the settings screen with a fresh round built from
    /// `config`'s defaults, scored by [`StepPenaltyScoring`]. The catalog is
    /// not loaded; see [`SessionStore::load_catalog`] and
    /// [`SessionStore::start`].
    #[must_use]
    pub fn new(
        config: GameConfig,
        service: Arc<dyn VerseService>,
        counter: Arc<dyn GuessCounter>,
    ) -> Self {
        Self::with_scoring_policy(
            config,
            service,
            counter,
            Arc::new(StepPenaltyScoring::default()),
        )
    }

    /// Like [`SessionStore::new`] with a custom scoring policy.
    #[must_use]
    pub fn with_scoring_policy(
        config: GameConfig,
        service: Arc<dyn VerseService>,
        counter: Arc<dyn GuessCounter>,
        scoring: Arc<dyn ScoringPolicy>,
    ) -> Self {
        let active = RoundSegment::new(config.default_segment_settings());
        Self {
            inner: Arc::new(StoreInner {
                state: Mutex::new(StoreState {
                    catalog: None,
                    catalog_attempts: 0,
                    finalized: Vec::new(),
                    active,
                    screen: ScreenState::Settings,
                    latest_ticket: 0,
                    processing_guess: false,
                }),
                catalog_gate: tokio::sync::Mutex::new(()),
                notifier: ChangeNotifier::new(),
                config,
                scoring,
                service,
                counter,
            }),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn notify_changed(&self) {
        self.inner.notifier.notify();
    }

    /// Subscribes to store-level changes (screen, rounds, catalog, busy flag).
    ///
    /// Changes inside a round are published by the segment itself.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.notifier.subscribe(listener)
    }

    // --- queries ---

    /// Session configuration.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.inner.config
    }

    /// Active scoring policy.
    #[must_use]
    pub fn scoring_policy(&self) -> &dyn ScoringPolicy {
        self.inner.scoring.as_ref()
    }

    /// The catalog, once loaded. `None` means "still loading" to the UI.
    #[must_use]
    pub fn catalog(&self) -> Option<Arc<Catalog>> {
        self.lock().catalog.clone()
    }

    /// Current screen.
    #[must_use]
    pub fn screen_state(&self) -> ScreenState {
        self.lock().screen
    }

    /// The round currently shown or being configured.
    #[must_use]
    pub fn active_segment(&self) -> RoundSegment {
        self.lock().active.clone()
    }

    /// Completed rounds, oldest first.
    #[must_use]
    pub fn finalized_segments(&self) -> Vec<RoundSegment> {
        self.lock().finalized.clone()
    }

    /// One-based number of the active round.
    #[must_use]
    pub fn round_number(&self) -> usize {
        self.lock().finalized.len() + 1
    }

    /// Advisory busy flag for guess submission. See the module docs.
    #[must_use]
    pub fn is_processing_guess(&self) -> bool {
        self.lock().processing_guess
    }

    /// Session score: each finalized round scored by the scoring policy and
    /// combined with the configured [`ScoreAggregation`].
    ///
    /// [`ScoreAggregation`]: super::aggregation::ScoreAggregation
    #[must_use]
    pub fn aggregate_score(&self) -> u32 {
        let finalized = self.finalized_segments();
        let scoring = self.scoring_policy();
        self.inner.config.score_aggregation.aggregate(
            finalized
                .iter()
                .map(|segment| segment.calculate_score(scoring)),
        )
    }

    // --- mutations ---

    /// Finalizes the active round and makes `next` active.
    ///
    /// A logged no-op outside `Playing`, or when `next` is already the active
    /// round or a finalized one. Returns whether the round advanced.
    ///
    /// `next` is not loaded here; the caller starts its load.
    pub fn start_next_round(&self, next: RoundSegment) -> bool {
        let advanced = self.lock().advance_round(next);
        if advanced {
            self.notify_changed();
        }
        advanced
    }

    /// Steps back one screen.
    ///
    /// From `Playing` the active round is dropped without being finalized and
    /// replaced by a fresh one with the same settings. From `Finished` the
    /// whole session resets to default settings. Returns `None` (logged) from
    /// `Settings`.
    pub fn previous_screen(&self) -> Option<ScreenChange> {
        self.apply_screen_event(ScreenEvent::Previous)
            .map(|(change, _)| change)
    }

    /// Runs one entry of the transition table. For `StartRound`, also returns
    /// the segment the caller must load.
    pub(crate) fn apply_screen_event(
        &self,
        event: ScreenEvent,
    ) -> Option<(ScreenChange, Option<RoundSegment>)> {
        let applied = {
            let mut state = self.lock();
            let from = state.screen;
            let Some((effect, to)) = screen::transition(from, event) else {
                tracing::debug!(screen = ?from, event = ?event, "no transition defined");
                return None;
            };
            let to_load = match effect {
                ScreenEffect::StartRound => Some(state.active.clone()),
                ScreenEffect::FinishSession => {
                    let attempted = state.active.guess_count() > 0;
                    if attempted || state.finalized.is_empty() {
                        let active = state.active.clone();
                        state.finalized.push(active);
                    } else {
                        tracing::debug!(
                            round_id = %state.active.id(),
                            "unattempted round not finalized"
                        );
                    }
                    None
                }
                ScreenEffect::AbandonRound => {
                    let fresh = RoundSegment::new(state.active.settings());
                    tracing::info!(
                        abandoned_round = %state.active.id(),
                        "round abandoned"
                    );
                    state.active = fresh;
                    None
                }
                ScreenEffect::ResetSession => {
                    state.finalized.clear();
                    state.active = RoundSegment::new(self.inner.config.default_segment_settings());
                    tracing::info!("session reset");
                    None
                }
            };
            state.screen = to;
            state.supersede_tickets();
            (ScreenChange { from, to, effect }, to_load)
        };
        self.notify_changed();
        Some(applied)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use verseguessr_core::verse::{Verse, VerseRef};
    use verseguessr_test_support::{
        RecordingGuessCounter, ScriptedVerseService, genesis_window, kjv_catalog_payload,
    };

    use super::*;
    use crate::domain::aggregation::ScoreAggregation;
    use crate::domain::segment::{HintLevel, SegmentSettings};

    fn store_with(config: GameConfig) -> SessionStore {
        let service = ScriptedVerseService::new(kjv_catalog_payload())
            .with_contexts(vec![genesis_window(1, 5, 2)]);
        SessionStore::new(
            config,
            Arc::new(service),
            Arc::new(RecordingGuessCounter::default()),
        )
    }

    fn store() -> SessionStore {
        store_with(GameConfig {
            default_version: "KJV".to_owned(),
            default_context_radius: 2,
            ..GameConfig::default()
        })
    }

    fn kjv_segment() -> RoundSegment {
        RoundSegment::new(SegmentSettings {
            version: "KJV".to_owned(),
            context_radius: 2,
        })
    }

    fn guess(verse: u32) -> Verse {
        Verse::unresolved(VerseRef::new("KJV", "Genesis", 1, verse))
    }

    fn enter_playing(store: &SessionStore) {
        store.apply_screen_event(ScreenEvent::Next).unwrap();
    }

    #[test]
    fn test_new_store_starts_on_settings_with_default_round() {
        let store = store();

        assert_eq!(store.screen_state(), ScreenState::Settings);
        assert!(store.catalog().is_none());
        assert!(store.finalized_segments().is_empty());
        assert_eq!(store.active_segment().version(), "KJV");
        assert_eq!(store.active_segment().context_radius(), 2);
        assert_eq!(store.round_number(), 1);
        assert!(!store.is_processing_guess());
    }

    #[test]
    fn test_start_round_returns_active_segment_to_load() {
        let store = store();
        let active = store.active_segment();

        let (change, to_load) = store.apply_screen_event(ScreenEvent::Next).unwrap();

        assert_eq!(change.to, ScreenState::Playing);
        assert!(to_load.unwrap().same_instance(&active));
    }

    #[test]
    fn test_previous_from_settings_is_noop() {
        let store = store();

        assert!(store.previous_screen().is_none());
        assert_eq!(store.screen_state(), ScreenState::Settings);
    }

    #[test]
    fn test_finish_finalizes_first_round_even_without_guesses() {
        let store = store();
        enter_playing(&store);
        let active = store.active_segment();

        let (change, _) = store.apply_screen_event(ScreenEvent::Next).unwrap();

        assert_eq!(change.effect, ScreenEffect::FinishSession);
        assert_eq!(store.screen_state(), ScreenState::Finished);
        let finalized = store.finalized_segments();
        assert_eq!(finalized.len(), 1);
        assert!(finalized[0].same_instance(&active));
    }

    #[test]
    fn test_finish_skips_unattempted_later_round() {
        let store = store();
        enter_playing(&store);
        assert!(store.start_next_round(kjv_segment()));

        store.apply_screen_event(ScreenEvent::Next).unwrap();

        assert_eq!(store.finalized_segments().len(), 1);
    }

    #[test]
    fn test_finish_keeps_attempted_later_round() {
        let store = store();
        enter_playing(&store);
        let next = kjv_segment();
        store.start_next_round(next.clone());
        next.record_guess(guess(1));

        store.apply_screen_event(ScreenEvent::Next).unwrap();

        let finalized = store.finalized_segments();
        assert_eq!(finalized.len(), 2);
        assert!(finalized[1].same_instance(&next));
    }

    #[test]
    fn test_no_transition_forward_from_finished() {
        let store = store();
        enter_playing(&store);
        store.apply_screen_event(ScreenEvent::Next).unwrap();

        assert!(store.apply_screen_event(ScreenEvent::Next).is_none());
        assert_eq!(store.screen_state(), ScreenState::Finished);
    }

    #[test]
    fn test_abandon_round_discards_active_and_keeps_settings() {
        let store = store();
        store.active_segment().set_context_radius(4).unwrap();
        enter_playing(&store);
        let abandoned = store.active_segment();

        let change = store.previous_screen().unwrap();

        assert_eq!(change.effect, ScreenEffect::AbandonRound);
        assert_eq!(store.screen_state(), ScreenState::Settings);
        assert!(store.finalized_segments().is_empty());
        let fresh = store.active_segment();
        assert!(!fresh.same_instance(&abandoned));
        assert_eq!(fresh.context_radius(), 4);
    }

    #[test]
    fn test_reset_from_finished_clears_session() {
        let store = store();
        enter_playing(&store);
        store.active_segment().record_guess(guess(1));
        store.start_next_round(kjv_segment());
        store.apply_screen_event(ScreenEvent::Next).unwrap();

        let change = store.previous_screen().unwrap();

        assert_eq!(change.effect, ScreenEffect::ResetSession);
        assert_eq!(store.screen_state(), ScreenState::Settings);
        assert!(store.finalized_segments().is_empty());
        assert_eq!(store.active_segment().guess_count(), 0);
        assert_eq!(store.active_segment().version(), "KJV");
    }

    #[test]
    fn test_start_next_round_finalizes_previous_active() {
        let store = store();
        enter_playing(&store);
        let first = store.active_segment();
        let next = kjv_segment();

        assert!(store.start_next_round(next.clone()));

        assert!(store.active_segment().same_instance(&next));
        assert!(store.finalized_segments()[0].same_instance(&first));
        assert_eq!(store.round_number(), 2);
    }

    #[test]
    fn test_start_next_round_rejects_known_segments() {
        let store = store();
        enter_playing(&store);
        let first = store.active_segment();
        store.start_next_round(kjv_segment());

        assert!(!store.start_next_round(first));
        assert!(!store.start_next_round(store.active_segment()));
        assert_eq!(store.finalized_segments().len(), 1);
    }

    #[test]
    fn test_start_next_round_outside_playing_is_noop() {
        let store = store();

        assert!(!store.start_next_round(kjv_segment()));
        assert!(store.finalized_segments().is_empty());
    }

    #[test]
    fn test_active_segment_never_finalized_while_playing() {
        let store = store();
        enter_playing(&store);
        for _ in 0..3 {
            store.start_next_round(kjv_segment());
            let active = store.active_segment();
            assert!(
                !store
                    .finalized_segments()
                    .iter()
                    .any(|done| done.same_instance(&active))
            );
        }
    }

    #[test]
    fn test_screen_changes_notify_store_listeners() {
        let store = store();
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let _sub = store.subscribe(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        enter_playing(&store);
        store.previous_screen();
        store.previous_screen();

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_listener_can_read_store_during_notification() {
        let store = store();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let reader = store.clone();
        let s = Arc::clone(&seen);
        let _sub = store.subscribe(move || {
            s.lock().unwrap().push(reader.screen_state());
        });

        enter_playing(&store);

        assert_eq!(*seen.lock().unwrap(), vec![ScreenState::Playing]);
    }

    #[test]
    fn test_aggregate_score_uses_maximum_by_default() {
        let store = store();
        enter_playing(&store);
        let first = store.active_segment();
        first.record_guess(guess(1));
        store.start_next_round(kjv_segment());
        let second = store.active_segment();
        second.record_guess(guess(1));
        second.record_guess(guess(2));
        second.add_hint();
        store.apply_screen_event(ScreenEvent::Next).unwrap();

        let policy = StepPenaltyScoring::default();
        assert_eq!(store.aggregate_score(), policy.score(HintLevel::NONE, 1));
    }

    #[test]
    fn test_aggregate_score_sum_policy() {
        let store = store_with(GameConfig {
            default_version: "KJV".to_owned(),
            default_context_radius: 2,
            score_aggregation: ScoreAggregation::Sum,
        });
        enter_playing(&store);
        store.active_segment().record_guess(guess(1));
        store.start_next_round(kjv_segment());
        store.active_segment().record_guess(guess(1));
        store.apply_screen_event(ScreenEvent::Next).unwrap();

        assert_eq!(store.aggregate_score(), 10_000);
    }

    #[test]
    fn test_aggregate_score_without_rounds_is_zero() {
        assert_eq!(store().aggregate_score(), 0);
    }

    #[test]
    fn test_custom_scoring_policy_is_used() {
        #[derive(Debug)]
        struct Flat;
        impl ScoringPolicy for Flat {
            fn name(&self) -> &'static str {
                "flat"
            }
            fn score(&self, _hint_level: HintLevel, _guess_count: usize) -> u32 {
                7
            }
        }
        let store = SessionStore::with_scoring_policy(
            GameConfig::default(),
            Arc::new(ScriptedVerseService::new(kjv_catalog_payload())),
            Arc::new(RecordingGuessCounter::default()),
            Arc::new(Flat),
        );
        enter_playing(&store);
        store.apply_screen_event(ScreenEvent::Next).unwrap();

        assert_eq!(store.aggregate_score(), 7);
        assert_eq!(store.scoring_policy().name(), "flat");
    }
}
