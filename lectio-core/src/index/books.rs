//! Book directory derived from the verse table

use super::ScriptureIndex;
use crate::verse::{Book, Testament, Verse};
use std::collections::{BTreeMap, BTreeSet};

/// Derive books from verses: ascending by id, each with its distinct chapters
/// in ascending order. The first name seen for an id is kept.
pub fn build_books(verses: &[Verse]) -> Vec<Book> {
    let mut grouped: BTreeMap<u32, (&str, BTreeSet<u32>)> = BTreeMap::new();
    for verse in verses {
        grouped
            .entry(verse.book_id)
            .or_insert_with(|| (verse.book.as_str(), BTreeSet::new()))
            .1
            .insert(verse.chapter);
    }

    grouped
        .into_iter()
        .map(|(id, (name, chapters))| Book {
            id,
            name: name.to_string(),
            chapters: chapters.into_iter().collect(),
        })
        .collect()
}

impl ScriptureIndex {
    /// All books, ascending by id
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn books_for_testament(&self, testament: Testament) -> Vec<&Book> {
        self.books
            .iter()
            .filter(|book| self.canon.testament_of(book.id) == testament)
            .collect()
    }

    pub fn book(&self, id: u32) -> Option<&Book> {
        self.books
            .binary_search_by_key(&id, |book| book.id)
            .ok()
            .map(|slot| &self.books[slot])
    }

    /// Case-insensitive exact name match
    pub fn book_by_name(&self, name: &str) -> Option<&Book> {
        let wanted = name.trim().to_lowercase();
        self.folded_books
            .iter()
            .position(|folded| *folded == wanted)
            .map(|slot| &self.books[slot])
    }

    /// First book (ascending id) whose name contains `word`, case-insensitively.
    ///
    /// "john" resolves to John rather than 1 John because John has the lower id.
    pub fn resolve_book(&self, word: &str) -> Option<&Book> {
        let wanted = word.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        self.folded_books
            .iter()
            .position(|folded| folded.contains(&wanted))
            .map(|slot| &self.books[slot])
    }
}
