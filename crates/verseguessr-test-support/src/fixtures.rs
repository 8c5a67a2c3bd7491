//! Fixture builders for catalog and context payloads.

use std::collections::BTreeMap;

use verseguessr_core::verse::GlobalIndex;
use verseguessr_core::wire::{CatalogPayload, ContextWindow, VersePayload};

/// A two-book KJV catalog: Genesis (31, 25) and Exodus (22, 25, 22).
#[must_use]
pub fn kjv_catalog_payload() -> CatalogPayload {
    let mut books = BTreeMap::new();
    books.insert(
        "KJV".to_owned(),
        vec!["Genesis".to_owned(), "Exodus".to_owned()],
    );
    CatalogPayload {
        version_names: vec!["KJV".to_owned()],
        book_names_by_version: books,
        verse_counts: vec![vec![31, 25], vec![22, 25, 22]],
    }
}

/// A KJV verse with placeholder text.
#[must_use]
pub fn verse_payload(book: &str, chapter: u32, verse: u32, global_index: i64) -> VersePayload {
    VersePayload {
        version: "KJV".to_owned(),
        book_name: book.to_owned(),
        chapter,
        verse_number: verse,
        global_verse_number: GlobalIndex::from(global_index),
        text: format!("{book} {chapter}:{verse}"),
    }
}

/// `len` consecutive verses of Genesis 1 starting at `first_verse`, with the
/// target at `local_index`. Global ordinals are `verse - 1`.
#[must_use]
pub fn genesis_window(first_verse: u32, len: u32, local_index: usize) -> ContextWindow {
    let verses = (first_verse..first_verse + len)
        .map(|verse| verse_payload("Genesis", 1, verse, i64::from(verse) - 1))
        .collect();
    ContextWindow {
        verses,
        local_verse_index: local_index,
    }
}
