//! The catalog: versions, book names, and verse counts.
//!
//! Every lookup fails soft. Lookups feed numeric input widgets that must
//! always render something, so an unknown version, book, or cell is logged
//! and answered with a fallback instead of an error.

use std::collections::BTreeMap;

use verseguessr_core::error::GameError;
use verseguessr_core::wire::CatalogPayload;

/// Verse count returned when the table has no cell for a chapter.
pub const FALLBACK_VERSE_COUNT: u32 = 1;

/// Read-only reference data. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    version_names: Vec<String>,
    book_names_by_version: BTreeMap<String, Vec<String>>,
    verse_counts: Vec<Vec<u32>>,
}

impl Catalog {
    /// Builds a catalog from its parts.
    ///
    /// Versions whose book list length differs from the verse-count table
    /// are kept (they may use another numbering scheme) but logged.
    #[must_use]
    pub fn new(
        version_names: Vec<String>,
        book_names_by_version: BTreeMap<String, Vec<String>>,
        verse_counts: Vec<Vec<u32>>,
    ) -> Self {
        for (version, books) in &book_names_by_version {
            if books.len() != verse_counts.len() {
                tracing::warn!(
                    version = %version,
                    books = books.len(),
                    table_rows = verse_counts.len(),
                    "book list length differs from verse-count table"
                );
            }
        }
        Self {
            version_names,
            book_names_by_version,
            verse_counts,
        }
    }

    /// Version names in display order.
    #[must_use]
    pub fn version_names(&self) -> &[String] {
        &self.version_names
    }

    /// Whether `version` has a book list.
    #[must_use]
    pub fn has_version(&self, version: &str) -> bool {
        self.book_names_by_version.contains_key(version)
    }

    /// Book names of `version` in canonical order; empty when unknown.
    #[must_use]
    pub fn book_names(&self, version: &str) -> &[String] {
        match self.book_names_by_version.get(version) {
            Some(books) => books,
            None => {
                tracing::warn!(version = %version, "unknown version");
                &[]
            }
        }
    }

    /// Canonical index of `book_name` within `version`.
    ///
    /// Exact, case-sensitive match. Returns `None` (and logs) for an unknown
    /// version or book.
    #[must_use]
    pub fn book_index(&self, version: &str, book_name: &str) -> Option<usize> {
        let Some(books) = self.book_names_by_version.get(version) else {
            tracing::warn!(version = %version, "book_index: unknown version");
            return None;
        };
        let index = books.iter().position(|name| name == book_name);
        if index.is_none() {
            tracing::warn!(version = %version, book = %book_name, "book_index: unknown book");
        }
        index
    }

    /// Number of chapters in `book_name`; `0` when the book is unknown.
    #[must_use]
    pub fn chapter_count(&self, version: &str, book_name: &str) -> usize {
        self.book_index(version, book_name)
            .and_then(|index| self.verse_counts.get(index))
            .map_or(0, Vec::len)
    }

    /// Verse count of a chapter, addressed by zero-based chapter index.
    ///
    /// Falls back to [`FALLBACK_VERSE_COUNT`] and logs an error when the cell
    /// does not exist.
    #[must_use]
    pub fn verse_count(&self, version: &str, book_name: &str, chapter_index: usize) -> u32 {
        let cell = self
            .book_index(version, book_name)
            .and_then(|index| self.verse_counts.get(index))
            .and_then(|row| row.get(chapter_index))
            .copied();
        match cell {
            Some(count) => count,
            None => {
                tracing::error!(
                    version = %version,
                    book = %book_name,
                    chapter_index,
                    "no verse count for chapter, using fallback"
                );
                FALLBACK_VERSE_COUNT
            }
        }
    }

    /// Clamps a one-based chapter number into `1..=chapter_count`.
    #[must_use]
    pub fn clamp_chapter(&self, version: &str, book_name: &str, chapter: u32) -> u32 {
        let max = u32::try_from(self.chapter_count(version, book_name))
            .unwrap_or(u32::MAX)
            .max(1);
        chapter.clamp(1, max)
    }

    /// Clamps a one-based verse number into `1..=verse_count` of the given
    /// one-based chapter.
    #[must_use]
    pub fn clamp_verse(&self, version: &str, book_name: &str, chapter: u32, verse: u32) -> u32 {
        let chapter_index = chapter.saturating_sub(1) as usize;
        let max = self.verse_count(version, book_name, chapter_index).max(1);
        verse.clamp(1, max)
    }

    /// Checks that a one-based reference exists in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Validation` for an unknown version or book, or a
    /// chapter or verse number outside the table.
    pub fn bound_reference(
        &self,
        version: &str,
        book_name: &str,
        chapter: u32,
        verse: u32,
    ) -> Result<usize, GameError> {
        let book_index = self.book_index(version, book_name).ok_or_else(|| {
            GameError::Validation(format!("unknown book {book_name:?} in version {version:?}"))
        })?;
        let row = self.verse_counts.get(book_index).ok_or_else(|| {
            GameError::Validation(format!("no chapter data for book {book_name:?}"))
        })?;
        let chapter_count = row.len();
        if chapter == 0 || chapter as usize > chapter_count {
            return Err(GameError::Validation(format!(
                "chapter {chapter} out of range 1..={chapter_count} for {book_name}"
            )));
        }
        let verse_count = row[chapter as usize - 1];
        if verse == 0 || verse > verse_count {
            return Err(GameError::Validation(format!(
                "verse {verse} out of range 1..={verse_count} for {book_name} {chapter}"
            )));
        }
        Ok(book_index)
    }
}

impl From<CatalogPayload> for Catalog {
    fn from(payload: CatalogPayload) -> Self {
        Self::new(
            payload.version_names,
            payload.book_names_by_version,
            payload.verse_counts,
        )
    }
}
