//! Response payloads returned by the verse service.
//!
//! Field names follow the service's camelCase JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::verse::GlobalIndex;

/// Reference data describing versions, book names, and verse counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPayload {
    /// Version names in display order.
    #[serde(rename = "bibleNames")]
    pub version_names: Vec<String>,
    /// Book names per version; position is the canonical book index.
    #[serde(rename = "bibleBookNames")]
    pub book_names_by_version: BTreeMap<String, Vec<String>>,
    /// `verse_counts[book_index][chapter_index]` is the verse count of that
    /// chapter. Chapter indices are zero-based.
    #[serde(rename = "dataMatrix")]
    pub verse_counts: Vec<Vec<u32>>,
}

/// One verse as delivered by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersePayload {
    /// Version name.
    pub version: String,
    /// Book name.
    pub book_name: String,
    /// One-based chapter number.
    pub chapter: u32,
    /// One-based verse number.
    pub verse_number: u32,
    /// Global ordinal; `-1` when unknown.
    #[serde(default)]
    pub global_verse_number: GlobalIndex,
    /// Verse text.
    #[serde(default)]
    pub text: String,
}

/// A random target verse with its surrounding context.
///
/// The window may hold fewer than `2 * radius + 1` verses when the target
/// sits near a book boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextWindow {
    /// Verses in canonical order.
    pub verses: Vec<VersePayload>,
    /// Position of the target verse inside `verses`.
    pub local_verse_index: usize,
}

impl ContextWindow {
    /// Decodes a window from JSON and checks that the target index is in
    /// range.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Parse` if the JSON is malformed or the target index
    /// points outside the verse array.
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let window: Self = serde_json::from_str(json)?;
        window.check()?;
        Ok(window)
    }

    /// Verifies `local_verse_index < verses.len()`.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Parse` when the target index is out of range.
    pub fn check(&self) -> Result<(), GameError> {
        if self.local_verse_index >= self.verses.len() {
            return Err(GameError::Parse(format!(
                "localVerseIndex {} out of range for {} verses",
                self.local_verse_index,
                self.verses.len()
            )));
        }
        Ok(())
    }
}
