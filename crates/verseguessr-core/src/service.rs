//! External collaborator contracts.
//!
//! The engine reaches the verse backend and the shared guess counter only
//! through these traits. Implementations own the transport.

use async_trait::async_trait;

use crate::error::GameError;
use crate::verse::GlobalIndex;
use crate::wire::{CatalogPayload, ContextWindow};

/// Verse lookup and catalog backend.
#[async_trait]
pub trait VerseService: Send + Sync {
    /// Loads the catalog of versions, book names, and verse counts.
    async fn fetch_catalog(&self) -> Result<CatalogPayload, GameError>;

    /// Picks a random verse in `version` and returns it with up to
    /// `context_radius` verses on either side.
    async fn fetch_random_context(
        &self,
        version: &str,
        context_radius: u32,
    ) -> Result<ContextWindow, GameError>;

    /// Resolves a reference to its global ordinal. Returns
    /// [`GlobalIndex::UNRESOLVED`] when the reference does not exist.
    async fn resolve_global_index(
        &self,
        book_index: usize,
        chapter: u32,
        verse_number: u32,
    ) -> Result<GlobalIndex, GameError>;
}

/// Site-wide count of submitted guesses.
#[async_trait]
pub trait GuessCounter: Send + Sync {
    /// Current total.
    async fn fetch_guess_count(&self) -> Result<u64, GameError>;

    /// Best-effort increment; callers ignore failures.
    async fn increment_guess_count(&self) -> Result<(), GameError>;
}
