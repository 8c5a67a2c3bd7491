//! Screen-level state machine.
//!
//! | State    | Event    | Effect          | Next     |
//! |----------|----------|-----------------|----------|
//! | Settings | Next     | `StartRound`    | Playing  |
//! | Settings | Previous | none            | Settings |
//! | Playing  | Next     | `FinishSession` | Finished |
//! | Playing  | Previous | `AbandonRound`  | Settings |
//! | Finished | Next     | none            | Finished |
//! | Finished | Previous | `ResetSession`  | Settings |
//!
//! The two backward transitions differ: leaving a round in progress drops
//! only that round, while leaving the finish screen wipes the session.

/// Coarse phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenState {
    /// Choosing version and context radius.
    Settings,
    /// Guessing.
    Playing,
    /// Reviewing results.
    Finished,
}

/// Navigation input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenEvent {
    /// Forward.
    Next,
    /// Back.
    Previous,
}

/// Side effect attached to a defined transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenEffect {
    /// Load the active segment.
    StartRound,
    /// Finalize the active segment if it was attempted (or is the first).
    FinishSession,
    /// Discard the active segment without finalizing it.
    AbandonRound,
    /// Clear all rounds and start over with default settings.
    ResetSession,
}

/// A transition that was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenChange {
    /// State before.
    pub from: ScreenState,
    /// State after.
    pub to: ScreenState,
    /// Effect that ran.
    pub effect: ScreenEffect,
}

/// Looks up `(state, event)` in the transition table.
///
/// Returns `None` for undefined transitions.
#[must_use]
pub const fn transition(
    state: ScreenState,
    event: ScreenEvent,
) -> Option<(ScreenEffect, ScreenState)> {
    match (state, event) {
        (ScreenState::Settings, ScreenEvent::Next) => {
            Some((ScreenEffect::StartRound, ScreenState::Playing))
        }
        (ScreenState::Playing, ScreenEvent::Next) => {
            Some((ScreenEffect::FinishSession, ScreenState::Finished))
        }
        (ScreenState::Playing, ScreenEvent::Previous) => {
            Some((ScreenEffect::AbandonRound, ScreenState::Settings))
        }
        (ScreenState::Finished, ScreenEvent::Previous) => {
            Some((ScreenEffect::ResetSession, ScreenState::Settings))
        }
        (ScreenState::Settings, ScreenEvent::Previous)
        | (ScreenState::Finished, ScreenEvent::Next) => None,
    }
}
