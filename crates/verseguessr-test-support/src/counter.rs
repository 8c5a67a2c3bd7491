//! Test guess counters.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use verseguessr_core::error::GameError;
use verseguessr_core::service::GuessCounter;

/// A counter that keeps its total in memory.
#[derive(Debug, Default)]
pub struct RecordingGuessCounter {
    count: AtomicU64,
}

impl RecordingGuessCounter {
    /// Creates a counter starting at `initial`.
    #[must_use]
    pub fn new(initial: u64) -> Self {
        Self {
            count: AtomicU64::new(initial),
        }
    }

    /// Current total.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GuessCounter for RecordingGuessCounter {
    async fn fetch_guess_count(&self) -> Result<u64, GameError> {
        Ok(self.count())
    }

    async fn increment_guess_count(&self) -> Result<(), GameError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A counter whose every call fails.
#[derive(Debug)]
pub struct FailingGuessCounter;

#[async_trait]
impl GuessCounter for FailingGuessCounter {
    async fn fetch_guess_count(&self) -> Result<u64, GameError> {
        Err(GameError::Service("counter offline".into()))
    }

    async fn increment_guess_count(&self) -> Result<(), GameError> {
        Err(GameError::Service("counter offline".into()))
    }
}
