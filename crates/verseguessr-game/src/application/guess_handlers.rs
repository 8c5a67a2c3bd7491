//! Guess submission.
//!
//! A submission validates the tuple against the catalog, resolves its global
//! index through the verse service, and then applies the result under the
//! store lock if its ticket is still the latest. See the
//! [`store`](crate::domain::store) module docs for the ticket rules.

use std::sync::Arc;

use verseguessr_core::error::GameError;
use verseguessr_core::verse::{GlobalIndex, Verse, VerseRef};

use super::load_handlers::{LoadHandle, spawn_load};
use crate::domain::screen::ScreenState;
use crate::domain::segment::{LoadState, RoundSegment};
use crate::domain::store::SessionStore;

/// Result of [`SessionStore::submit_guess`].
#[derive(Debug)]
pub enum GuessOutcome {
    /// The guess named the target. The round was finalized and `next_round`
    /// is now active and loading.
    Correct {
        /// Guesses in the won round, this one included.
        guess_count: usize,
        /// The round that replaced it.
        next_round: RoundSegment,
        /// Load of `next_round`.
        pending_load: LoadHandle,
    },
    /// The guess was recorded and missed.
    Incorrect {
        /// Guesses in the round so far.
        guess_count: usize,
    },
    /// The tuple was already guessed this round. Nothing was recorded.
    Duplicate,
    /// A newer submission or a round change overtook this one while its
    /// global index was resolving. Nothing was recorded.
    Superseded,
}

impl GuessOutcome {
    /// Whether the guess was recorded.
    #[must_use]
    pub fn is_recorded(&self) -> bool {
        matches!(self, Self::Correct { .. } | Self::Incorrect { .. })
    }
}

/// Clears the busy flag when a submission is dropped before its result is
/// applied, unless a newer ticket has taken over.
struct TicketGuard<'a> {
    store: &'a SessionStore,
    ticket: u64,
}

impl Drop for TicketGuard<'_> {
    fn drop(&mut self) {
        let released = {
            let mut state = self.store.lock();
            let held = state.latest_ticket == self.ticket && state.processing_guess;
            if held {
                state.processing_guess = false;
            }
            held
        };
        if released {
            tracing::debug!(ticket = self.ticket, "guess submission dropped before completion");
            self.store.notify_changed();
        }
    }
}

struct PendingGuess {
    ticket: u64,
    segment: RoundSegment,
    reference: VerseRef,
    book_index: usize,
}

impl SessionStore {
    /// Submits a guess for the active round.
    ///
    /// The version is the active round's. The tuple is checked against the
    /// catalog; duplicates are reported without contacting any service. A
    /// failed global-index resolution is recorded as unresolved. The shared
    /// guess counter is incremented in the background and its failures are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidState` outside `Playing`, before the
    /// catalog is loaded, or while the active round is not `Ready`, and
    /// `GameError::Validation` for a tuple the catalog does not contain.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub async fn submit_guess(
        &self,
        book_name: &str,
        chapter: u32,
        verse_number: u32,
    ) -> Result<GuessOutcome, GameError> {
        let Some(pending) = self.prepare_guess(book_name, chapter, verse_number)? else {
            return Ok(GuessOutcome::Duplicate);
        };
        let _ticket_guard = TicketGuard {
            store: self,
            ticket: pending.ticket,
        };
        self.notify_changed();
        tracing::debug!(
            ticket = pending.ticket,
            round_id = %pending.segment.id(),
            guess = %pending.reference,
            "guess submitted"
        );

        let global_index = match self
            .inner
            .service
            .resolve_global_index(pending.book_index, chapter, verse_number)
            .await
        {
            Ok(index) => index,
            Err(err) => {
                tracing::warn!(ticket = pending.ticket, error = %err, "global index resolution failed");
                GlobalIndex::UNRESOLVED
            }
        };
        self.spawn_counter_increment();

        let PendingGuess {
            ticket,
            segment,
            reference,
            ..
        } = pending;
        let applied = {
            let mut state = self.lock();
            if state.latest_ticket != ticket || !state.active.same_instance(&segment) {
                None
            } else {
                state.processing_guess = false;
                let correct = segment.is_target(&reference);
                let guess_count = segment.push_guess(Verse::new(reference, global_index, ""));
                let next_round = correct.then(|| {
                    segment.set_succeeded();
                    let next = RoundSegment::new(segment.settings());
                    state.advance_round(next.clone());
                    next
                });
                Some((guess_count, next_round))
            }
        };

        let Some((guess_count, next_round)) = applied else {
            tracing::debug!(ticket, "guess result superseded, discarded");
            return Ok(GuessOutcome::Superseded);
        };
        segment.notify_changed();
        self.notify_changed();
        match next_round {
            Some(next_round) => {
                tracing::info!(
                    round_id = %segment.id(),
                    guess_count,
                    next_round_id = %next_round.id(),
                    "round won"
                );
                let pending_load = spawn_load(next_round.clone(), Arc::clone(&self.inner.service));
                Ok(GuessOutcome::Correct {
                    guess_count,
                    next_round,
                    pending_load,
                })
            }
            None => {
                tracing::debug!(round_id = %segment.id(), guess_count, "guess missed");
                Ok(GuessOutcome::Incorrect { guess_count })
            }
        }
    }

    /// Validates a submission and takes its ticket. `Ok(None)` for a
    /// duplicate.
    fn prepare_guess(
        &self,
        book_name: &str,
        chapter: u32,
        verse_number: u32,
    ) -> Result<Option<PendingGuess>, GameError> {
        let mut state = self.lock();
        if state.screen != ScreenState::Playing {
            return Err(GameError::InvalidState(format!(
                "guesses are only accepted while Playing, screen is {:?}",
                state.screen
            )));
        }
        let Some(catalog) = state.catalog.clone() else {
            return Err(GameError::InvalidState("catalog not loaded".to_owned()));
        };
        let segment = state.active.clone();
        let load_state = segment.load_state();
        if load_state != LoadState::Ready {
            return Err(GameError::InvalidState(format!(
                "active round is {load_state:?}, not Ready"
            )));
        }
        let version = segment.version();
        let book_index = catalog.bound_reference(&version, book_name, chapter, verse_number)?;
        let reference = VerseRef::new(version, book_name, chapter, verse_number);
        if segment.has_guessed(&reference) {
            tracing::debug!(round_id = %segment.id(), guess = %reference, "duplicate guess ignored");
            return Ok(None);
        }
        let ticket = state.take_ticket();
        Ok(Some(PendingGuess {
            ticket,
            segment,
            reference,
            book_index,
        }))
    }

    fn spawn_counter_increment(&self) {
        let counter = Arc::clone(&self.inner.counter);
        tokio::spawn(async move {
            if let Err(err) = counter.increment_guess_count().await {
                tracing::debug!(error = %err, "guess count increment failed");
            }
        });
    }
}
