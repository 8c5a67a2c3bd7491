//! The round segment: one unit of gameplay.
//!
//! A segment holds the context window, the target verse, the guess history,
//! and the hint level of a single round, plus its own load sub-state.
//!
//! Load states only move forward:
//!
//! ```text
//! Uninitialized ──begin_load──▶ Loading ──complete_load──▶ Ready | Error
//! ```
//!
//! `Error` is terminal for the instance. Retrying means building a new
//! segment.
//!
//! `RoundSegment` is a cheap-clone handle. Every clone refers to the same
//! round, so a context response that arrives after the player moved on
//! still lands in the segment that requested it and nowhere else.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use uuid::Uuid;
use verseguessr_core::error::GameError;
use verseguessr_core::notifier::{ChangeNotifier, Subscription};
use verseguessr_core::verse::{Verse, VerseRef};
use verseguessr_core::wire::ContextWindow;

use super::scoring::ScoringPolicy;

/// Largest context radius the verse service accepts.
pub const MAX_CONTEXT_RADIUS: u32 = 50;

/// Load sub-state of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Created, no request issued yet.
    Uninitialized,
    /// Context request in flight.
    Loading,
    /// Context and target verse are available.
    Ready,
    /// The context request failed. Terminal.
    Error,
}

/// Progressive reveal counter in `0..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HintLevel(u8);

impl HintLevel {
    /// No hints taken.
    pub const NONE: Self = Self(0);
    /// Book, chapter, and verse revealed.
    pub const MAX: Self = Self(3);

    /// Builds a level, clamped to `0..=3`.
    #[must_use]
    pub fn new(level: u8) -> Self {
        Self(level.min(Self::MAX.0))
    }

    /// Numeric level.
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }

    /// Whether the book name is revealed.
    #[must_use]
    pub fn reveals_book(self) -> bool {
        self.0 >= 1
    }

    /// Whether the chapter is revealed.
    #[must_use]
    pub fn reveals_chapter(self) -> bool {
        self.0 >= 2
    }

    /// Whether the verse number is revealed.
    #[must_use]
    pub fn reveals_verse(self) -> bool {
        self.0 >= 3
    }
}

/// What the current hint level reveals about the target verse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HintReveal {
    /// Book name, from level 1.
    pub book_name: Option<String>,
    /// Chapter, from level 2.
    pub chapter: Option<u32>,
    /// Verse number, from level 3.
    pub verse_number: Option<u32>,
}

/// Per-round settings chosen on the settings screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentSettings {
    /// Version the target is drawn from.
    pub version: String,
    /// Requested verses above and below the target.
    pub context_radius: u32,
}

/// The request a segment issues when its load begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    /// Segment that issued the request.
    pub round_id: Uuid,
    /// Version to draw from.
    pub version: String,
    /// Requested radius.
    pub context_radius: u32,
}

#[derive(Debug)]
struct SegmentState {
    settings: SegmentSettings,
    context_above: Vec<Verse>,
    context_below: Vec<Verse>,
    verse_to_guess: Option<Verse>,
    guess_history: Vec<Verse>,
    hint_level: HintLevel,
    load_state: LoadState,
    has_succeeded: bool,
}

#[derive(Debug)]
struct SegmentInner {
    id: Uuid,
    state: Mutex<SegmentState>,
    notifier: ChangeNotifier,
}

/// Handle to one round's state.
#[derive(Debug, Clone)]
pub struct RoundSegment {
    inner: Arc<SegmentInner>,
}

impl RoundSegment {
    /// Creates an uninitialized segment.
    #[must_use]
    pub fn new(settings: SegmentSettings) -> Self {
        Self {
            inner: Arc::new(SegmentInner {
                id: Uuid::new_v4(),
                state: Mutex::new(SegmentState {
                    settings,
                    context_above: Vec::new(),
                    context_below: Vec::new(),
                    verse_to_guess: None,
                    guess_history: Vec::new(),
                    hint_level: HintLevel::NONE,
                    load_state: LoadState::Uninitialized,
                    has_succeeded: false,
                }),
                notifier: ChangeNotifier::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SegmentState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Notifies this segment's listeners. Never called with a lock held.
    pub(crate) fn notify_changed(&self) {
        self.inner.notifier.notify();
    }

    /// Stable identifier of this round.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Whether `other` is a handle to the same round.
    #[must_use]
    pub fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Subscribes to changes of this round.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.notifier.subscribe(listener)
    }

    // --- settings ---

    /// Current settings.
    #[must_use]
    pub fn settings(&self) -> SegmentSettings {
        self.lock().settings.clone()
    }

    /// Version name.
    #[must_use]
    pub fn version(&self) -> String {
        self.lock().settings.version.clone()
    }

    /// Requested context radius.
    #[must_use]
    pub fn context_radius(&self) -> u32 {
        self.lock().settings.context_radius
    }

    /// Changes the version before the round is loaded.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Validation` for an empty name and
    /// `GameError::InvalidState` once loading has begun.
    pub fn set_version(&self, version: impl Into<String>) -> Result<(), GameError> {
        let version = version.into();
        if version.trim().is_empty() {
            return Err(GameError::Validation("version must not be empty".to_owned()));
        }
        {
            let mut state = self.lock();
            Self::require_uninitialized(&state)?;
            state.settings.version = version;
        }
        self.notify_changed();
        Ok(())
    }

    /// Changes the context radius before the round is loaded.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Validation` above [`MAX_CONTEXT_RADIUS`] and
    /// `GameError::InvalidState` once loading has begun.
    pub fn set_context_radius(&self, context_radius: u32) -> Result<(), GameError> {
        if context_radius > MAX_CONTEXT_RADIUS {
            return Err(GameError::Validation(format!(
                "context radius {context_radius} exceeds {MAX_CONTEXT_RADIUS}"
            )));
        }
        {
            let mut state = self.lock();
            Self::require_uninitialized(&state)?;
            state.settings.context_radius = context_radius;
        }
        self.notify_changed();
        Ok(())
    }

    fn require_uninitialized(state: &SegmentState) -> Result<(), GameError> {
        if state.load_state != LoadState::Uninitialized {
            return Err(GameError::InvalidState(
                "segment settings are fixed once loading begins".to_owned(),
            ));
        }
        Ok(())
    }

    // --- loading ---

    /// Current load state.
    #[must_use]
    pub fn load_state(&self) -> LoadState {
        self.lock().load_state
    }

    /// Moves `Uninitialized` to `Loading` and returns the request to issue.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidState` from any other state.
    pub fn begin_load(&self) -> Result<LoadRequest, GameError> {
        let request = {
            let mut state = self.lock();
            if state.load_state != LoadState::Uninitialized {
                return Err(GameError::InvalidState(format!(
                    "load can only begin from Uninitialized, segment is {:?}",
                    state.load_state
                )));
            }
            state.load_state = LoadState::Loading;
            LoadRequest {
                round_id: self.inner.id,
                version: state.settings.version.clone(),
                context_radius: state.settings.context_radius,
            }
        };
        self.notify_changed();
        Ok(request)
    }

    /// Applies the outcome of the context request to this segment.
    ///
    /// On success, verses before the target go to `context_below`, verses
    /// after it go to `context_above`, and the target becomes
    /// `verse_to_guess`. A failed request, or a window whose target index is
    /// out of range, leaves the context empty and the segment in `Error`.
    ///
    /// Ignored (with a warning) unless the segment is `Loading`.
    pub fn complete_load(&self, response: Result<ContextWindow, GameError>) -> LoadState {
        let outcome = {
            let mut state = self.lock();
            if state.load_state != LoadState::Loading {
                tracing::warn!(
                    round_id = %self.inner.id,
                    state = ?state.load_state,
                    "context response for a segment that is not loading, ignored"
                );
                return state.load_state;
            }
            match response.and_then(|window| window.check().map(|()| window)) {
                Ok(window) => {
                    let target = window.local_verse_index;
                    let mut below = Vec::with_capacity(target);
                    let mut above = Vec::new();
                    let mut verse_to_guess = None;
                    for (index, payload) in window.verses.into_iter().enumerate() {
                        let verse = Verse::from(payload);
                        match index.cmp(&target) {
                            std::cmp::Ordering::Less => below.push(verse),
                            std::cmp::Ordering::Equal => verse_to_guess = Some(verse),
                            std::cmp::Ordering::Greater => above.push(verse),
                        }
                    }
                    state.context_below = below;
                    state.context_above = above;
                    state.verse_to_guess = verse_to_guess;
                    state.load_state = LoadState::Ready;
                }
                Err(err) => {
                    tracing::warn!(round_id = %self.inner.id, error = %err, "context load failed");
                    state.load_state = LoadState::Error;
                }
            }
            state.load_state
        };
        self.notify_changed();
        outcome
    }

    /// Verses after the target, in canonical order.
    #[must_use]
    pub fn context_above(&self) -> Vec<Verse> {
        self.lock().context_above.clone()
    }

    /// Verses before the target, in canonical order.
    #[must_use]
    pub fn context_below(&self) -> Vec<Verse> {
        self.lock().context_below.clone()
    }

    /// The verse to guess, once loaded.
    #[must_use]
    pub fn verse_to_guess(&self) -> Option<Verse> {
        self.lock().verse_to_guess.clone()
    }

    // --- guesses ---

    /// Appends a guess and notifies. Returns the new guess count.
    ///
    /// Does not check for duplicates; callers use [`Self::has_guessed`]
    /// before submitting.
    pub fn record_guess(&self, guess: Verse) -> usize {
        let count = self.push_guess(guess);
        self.notify_changed();
        count
    }

    pub(crate) fn push_guess(&self, guess: Verse) -> usize {
        let mut state = self.lock();
        state.guess_history.push(guess);
        state.guess_history.len()
    }

    /// Submitted guesses, oldest first.
    #[must_use]
    pub fn guess_history(&self) -> Vec<Verse> {
        self.lock().guess_history.clone()
    }

    /// Number of submitted guesses.
    #[must_use]
    pub fn guess_count(&self) -> usize {
        self.lock().guess_history.len()
    }

    /// Whether `reference` equals the full tuple, version included, of any
    /// recorded guess.
    #[must_use]
    pub fn has_guessed(&self, reference: &VerseRef) -> bool {
        self.lock()
            .guess_history
            .iter()
            .any(|guess| guess.reference() == reference)
    }

    /// Whether `reference` names the target verse by book, chapter and verse.
    /// The version label is not compared. `false` before loading.
    #[must_use]
    pub fn is_target(&self, reference: &VerseRef) -> bool {
        self.lock().verse_to_guess.as_ref().is_some_and(|target| {
            target.book_name() == reference.book_name
                && target.chapter() == reference.chapter
                && target.verse_number() == reference.verse_number
        })
    }

    /// Whether the round was won.
    #[must_use]
    pub fn has_succeeded(&self) -> bool {
        self.lock().has_succeeded
    }

    /// Marks the round as won.
    pub fn mark_succeeded(&self) {
        self.set_succeeded();
        self.notify_changed();
    }

    pub(crate) fn set_succeeded(&self) {
        self.lock().has_succeeded = true;
    }

    // --- hints ---

    /// Current hint level.
    #[must_use]
    pub fn hint_level(&self) -> HintLevel {
        self.lock().hint_level
    }

    /// Raises the hint level by one. Returns `false` (no-op) at level 3.
    pub fn add_hint(&self) -> bool {
        {
            let mut state = self.lock();
            if state.hint_level >= HintLevel::MAX {
                tracing::debug!(round_id = %self.inner.id, "hint level already at maximum");
                return false;
            }
            state.hint_level = HintLevel(state.hint_level.0 + 1);
        }
        self.notify_changed();
        true
    }

    /// The parts of the target revealed by the current hint level.
    #[must_use]
    pub fn hint_reveal(&self) -> HintReveal {
        let state = self.lock();
        let (Some(target), level) = (state.verse_to_guess.as_ref(), state.hint_level) else {
            return HintReveal::default();
        };
        HintReveal {
            book_name: level.reveals_book().then(|| target.book_name().to_owned()),
            chapter: level.reveals_chapter().then(|| target.chapter()),
            verse_number: level.reveals_verse().then(|| target.verse_number()),
        }
    }

    // --- scoring ---

    /// Score of this round under `policy`.
    #[must_use]
    pub fn calculate_score(&self, policy: &dyn ScoringPolicy) -> u32 {
        let (hint_level, guess_count) = {
            let state = self.lock();
            (state.hint_level, state.guess_history.len())
        };
        policy.score(hint_level, guess_count)
    }
}
