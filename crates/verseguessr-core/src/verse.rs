//! Verse value type, global ordinal, and distance.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::notifier::{ChangeNotifier, Subscription};
use crate::wire::VersePayload;

/// Canonical cross-book ordinal of a verse.
///
/// The wire representation is a signed integer where `-1` means the
/// reference has not been resolved (or the service could not find it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct GlobalIndex(i64);

impl GlobalIndex {
    /// Sentinel for an unresolved or unknown ordinal.
    pub const UNRESOLVED: Self = Self(-1);

    /// Wraps a resolved ordinal.
    #[must_use]
    pub fn resolved(ordinal: u32) -> Self {
        Self(i64::from(ordinal))
    }

    /// Returns `true` unless this is the sentinel.
    #[must_use]
    pub fn is_resolved(self) -> bool {
        self.0 >= 0
    }

    /// The ordinal, or `None` for the sentinel.
    #[must_use]
    pub fn get(self) -> Option<u64> {
        u64::try_from(self.0).ok()
    }

    /// The wire value (`-1` for the sentinel).
    #[must_use]
    pub fn raw(self) -> i64 {
        self.0
    }
}

impl Default for GlobalIndex {
    fn default() -> Self {
        Self::UNRESOLVED
    }
}

impl From<i64> for GlobalIndex {
    fn from(value: i64) -> Self {
        if value < 0 { Self::UNRESOLVED } else { Self(value) }
    }
}

impl From<GlobalIndex> for i64 {
    fn from(value: GlobalIndex) -> Self {
        value.0
    }
}

/// Distance between two verses.
///
/// There is no numeric distance when either verse is unresolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerseDistance {
    /// Absolute difference of the two ordinals.
    Known(u64),
    /// At least one side carries [`GlobalIndex::UNRESOLVED`].
    Unknown,
}

impl VerseDistance {
    /// The numeric distance, if known.
    #[must_use]
    pub fn known(self) -> Option<u64> {
        match self {
            Self::Known(distance) => Some(distance),
            Self::Unknown => None,
        }
    }
}

/// The guess tuple: the key used for duplicate-guess and correctness checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerseRef {
    /// Version name.
    pub version: String,
    /// Book name, exact and case-sensitive.
    pub book_name: String,
    /// One-based chapter number.
    pub chapter: u32,
    /// One-based verse number.
    pub verse_number: u32,
}

impl VerseRef {
    /// Builds a reference.
    #[must_use]
    pub fn new(
        version: impl Into<String>,
        book_name: impl Into<String>,
        chapter: u32,
        verse_number: u32,
    ) -> Self {
        Self {
            version: version.into(),
            book_name: book_name.into(),
            chapter,
            verse_number,
        }
    }
}

impl fmt::Display for VerseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.book_name, self.chapter, self.verse_number)
    }
}

/// A scripture reference with its text and global ordinal.
///
/// `text` and `global_index` are mutable; changing either notifies this
/// instance's listeners. Clones are independent instances and start with
/// no listeners.
#[derive(Debug)]
pub struct Verse {
    reference: VerseRef,
    global_index: GlobalIndex,
    text: String,
    notifier: ChangeNotifier,
}

impl Verse {
    /// Creates a verse.
    #[must_use]
    pub fn new(reference: VerseRef, global_index: GlobalIndex, text: impl Into<String>) -> Self {
        Self {
            reference,
            global_index,
            text: text.into(),
            notifier: ChangeNotifier::new(),
        }
    }

    /// Creates a verse with no text and an unresolved ordinal, as built from
    /// player input before resolution.
    #[must_use]
    pub fn unresolved(reference: VerseRef) -> Self {
        Self::new(reference, GlobalIndex::UNRESOLVED, String::new())
    }

    /// The guess tuple for this verse.
    #[must_use]
    pub fn reference(&self) -> &VerseRef {
        &self.reference
    }

    /// Version name.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.reference.version
    }

    /// Book name.
    #[must_use]
    pub fn book_name(&self) -> &str {
        &self.reference.book_name
    }

    /// One-based chapter number.
    #[must_use]
    pub fn chapter(&self) -> u32 {
        self.reference.chapter
    }

    /// One-based verse number.
    #[must_use]
    pub fn verse_number(&self) -> u32 {
        self.reference.verse_number
    }

    /// Global ordinal (possibly the unresolved sentinel).
    #[must_use]
    pub fn global_index(&self) -> GlobalIndex {
        self.global_index
    }

    /// Verse text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// "Book, chapter, verse".
    #[must_use]
    pub fn identifier(&self) -> String {
        self.reference.to_string()
    }

    /// Whether `other` has the same guess tuple.
    #[must_use]
    pub fn same_reference(&self, other: &Self) -> bool {
        self.reference == other.reference
    }

    /// Distance to `other`; [`VerseDistance::Unknown`] if either ordinal is
    /// unresolved.
    #[must_use]
    pub fn distance(&self, other: &Self) -> VerseDistance {
        match (self.global_index.get(), other.global_index.get()) {
            (Some(a), Some(b)) => VerseDistance::Known(a.abs_diff(b)),
            _ => VerseDistance::Unknown,
        }
    }

    /// Replaces the text, notifying listeners if it changed.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.text != text {
            self.text = text;
            self.notifier.notify();
        }
    }

    /// Replaces the global ordinal, notifying listeners if it changed.
    pub fn set_global_index(&mut self, global_index: GlobalIndex) {
        if self.global_index != global_index {
            self.global_index = global_index;
            self.notifier.notify();
        }
    }

    /// Subscribes to changes of this instance.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.notifier.subscribe(listener)
    }
}

impl Clone for Verse {
    fn clone(&self) -> Self {
        Self::new(self.reference.clone(), self.global_index, self.text.clone())
    }
}

impl PartialEq for Verse {
    fn eq(&self, other: &Self) -> bool {
        self.reference == other.reference
            && self.global_index == other.global_index
            && self.text == other.text
    }
}

impl Eq for Verse {}

impl From<VersePayload> for Verse {
    fn from(payload: VersePayload) -> Self {
        Self::new(
            VerseRef {
                version: payload.version,
                book_name: payload.book_name,
                chapter: payload.chapter,
                verse_number: payload.verse_number,
            },
            payload.global_verse_number,
            payload.text,
        )
    }
}
