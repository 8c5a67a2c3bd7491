//! Session-level orchestration: catalog loading, screen navigation, skips,
//! hints, and the shared guess counter.

use std::sync::Arc;

use tokio::task::JoinHandle;
use verseguessr_catalog::application::load_handlers::handle_load_catalog;
use verseguessr_core::service::{GuessCounter, VerseService};

use super::load_handlers::{LoadHandle, spawn_load};
use crate::config::GameConfig;
use crate::domain::screen::{ScreenChange, ScreenEvent, ScreenState};
use crate::domain::segment::RoundSegment;
use crate::domain::store::SessionStore;

/// A forward screen transition that was applied.
#[derive(Debug)]
pub struct ScreenTransition {
    /// The transition.
    pub change: ScreenChange,
    /// Load of the round that just started, for `Settings -> Playing`.
    pub pending_load: Option<LoadHandle>,
}

impl SessionStore {
    /// Creates a store and starts loading the catalog in the background.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn start(
        config: GameConfig,
        service: Arc<dyn VerseService>,
        counter: Arc<dyn GuessCounter>,
    ) -> Self {
        let store = Self::new(config, service, counter);
        drop(store.spawn_catalog_load());
        store
    }

    /// Fetches the catalog once and installs it.
    ///
    /// Returns whether a catalog is available afterwards. A call made while
    /// another load is in flight waits for that load and reports its result
    /// instead of fetching again. A failed fetch is logged and leaves the
    /// catalog absent; a later call retries.
    pub async fn load_catalog(&self) -> bool {
        let attempts_seen = {
            let state = self.lock();
            if state.catalog.is_some() {
                return true;
            }
            state.catalog_attempts
        };
        let _gate = self.inner.catalog_gate.lock().await;
        {
            let state = self.lock();
            if state.catalog.is_some() {
                return true;
            }
            if state.catalog_attempts != attempts_seen {
                tracing::debug!("joined catalog load failed");
                return false;
            }
        }
        let result = handle_load_catalog(self.inner.service.as_ref()).await;
        let loaded = {
            let mut state = self.lock();
            state.catalog_attempts += 1;
            match result {
                Ok(catalog) => {
                    state.catalog = Some(Arc::new(catalog));
                    true
                }
                Err(err) => {
                    tracing::error!(error = %err, "catalog load failed");
                    false
                }
            }
        };
        if loaded {
            self.notify_changed();
        }
        loaded
    }

    /// Runs [`SessionStore::load_catalog`] on the tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn_catalog_load(&self) -> JoinHandle<bool> {
        let store = self.clone();
        tokio::spawn(async move { store.load_catalog().await })
    }

    /// Steps forward one screen.
    ///
    /// From `Settings` the active round starts loading in the background and
    /// its handle is returned in the transition. From `Playing` the session
    /// finishes. Returns `None` (logged) from `Finished`.
    ///
    /// # Panics
    ///
    /// Panics if a round load must be spawned outside a tokio runtime.
    pub fn next_screen(&self) -> Option<ScreenTransition> {
        let (change, to_load) = self.apply_screen_event(ScreenEvent::Next)?;
        tracing::info!(from = ?change.from, to = ?change.to, effect = ?change.effect, "screen changed");
        let pending_load =
            to_load.map(|segment| spawn_load(segment, Arc::clone(&self.inner.service)));
        Some(ScreenTransition {
            change,
            pending_load,
        })
    }

    /// Gives up on the active round and starts a new one with the same
    /// settings. The skipped round is finalized, guesses or not.
    ///
    /// Returns the new round's load, or `None` outside `Playing`.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn skip_round(&self) -> Option<LoadHandle> {
        let next = {
            let mut state = self.lock();
            if state.screen != ScreenState::Playing {
                tracing::debug!(screen = ?state.screen, "skip outside Playing, ignored");
                return None;
            }
            let next = RoundSegment::new(state.active.settings());
            tracing::info!(round_id = %state.active.id(), "round skipped");
            if !state.advance_round(next.clone()) {
                return None;
            }
            next
        };
        self.notify_changed();
        Some(spawn_load(next, Arc::clone(&self.inner.service)))
    }

    /// Raises the active round's hint level. Returns `false` outside
    /// `Playing` or when no more hints are available.
    pub fn request_hint(&self) -> bool {
        let active = {
            let state = self.lock();
            if state.screen != ScreenState::Playing {
                tracing::debug!(screen = ?state.screen, "hint outside Playing, ignored");
                return false;
            }
            state.active.clone()
        };
        active.add_hint()
    }

    /// Site-wide number of submitted guesses, or `None` if the counter is
    /// unavailable.
    pub async fn global_guess_count(&self) -> Option<u64> {
        match self.inner.counter.fetch_guess_count().await {
            Ok(count) => Some(count),
            Err(err) => {
                tracing::debug!(error = %err, "guess count unavailable");
                None
            }
        }
    }
}
