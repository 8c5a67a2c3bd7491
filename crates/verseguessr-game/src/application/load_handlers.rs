//! Round loading.
//!
//! The load protocol is three explicit steps: `begin_load` on the segment
//! (synchronous), the awaited service call with no lock held, then
//! `complete_load` on the same segment handle. The handle is captured at the
//! start, so a response always lands in the segment that asked for it.

use std::sync::Arc;

use tokio::task::JoinHandle;
use verseguessr_core::service::VerseService;

use crate::domain::segment::{LoadState, RoundSegment};

/// A spawned round load. Resolves to the segment's load state afterwards.
pub type LoadHandle = JoinHandle<LoadState>;

/// Loads `segment`'s context window from `service`.
///
/// A segment that is not `Uninitialized` is left alone and its current state
/// returned.
pub async fn handle_initiate_load(segment: &RoundSegment, service: &dyn VerseService) -> LoadState {
    let request = match segment.begin_load() {
        Ok(request) => request,
        Err(err) => {
            tracing::warn!(round_id = %segment.id(), error = %err, "initiate_load ignored");
            return segment.load_state();
        }
    };
    tracing::debug!(
        round_id = %request.round_id,
        version = %request.version,
        context_radius = request.context_radius,
        "requesting context window"
    );
    let response = service
        .fetch_random_context(&request.version, request.context_radius)
        .await;
    let state = segment.complete_load(response);
    tracing::info!(round_id = %request.round_id, state = ?state, "round load finished");
    state
}

/// Runs [`handle_initiate_load`] on the tokio runtime.
///
/// # Panics
///
/// Panics if called outside a tokio runtime.
pub fn spawn_load(segment: RoundSegment, service: Arc<dyn VerseService>) -> LoadHandle {
    tokio::spawn(async move { handle_initiate_load(&segment, service.as_ref()).await })
}

impl RoundSegment {
    /// Loads this round's context window. See [`handle_initiate_load`].
    pub async fn initiate_load(&self, service: &dyn VerseService) -> LoadState {
        handle_initiate_load(self, service).await
    }
}
