//! In-memory scripture index: verse table plus derived lookup structures.
//!
//! A [`ScriptureIndex`] is built once from a [`LoadedCorpus`] and never mutated
//! afterwards, so it can be shared across threads behind an `Arc` without locks.

mod books;

use crate::corpus::{LoadStats, LoadedCorpus};
use crate::verse::{Book, Canon, Verse, VerseKey};
use std::collections::{BTreeMap, HashMap};

pub use books::build_books;

pub struct ScriptureIndex {
    verses: Vec<Verse>,
    /// Lower-cased verse text, parallel to `verses`
    folded_text: Vec<String>,
    /// Position in `books` for each verse, parallel to `verses`
    verse_book: Vec<usize>,
    by_key: HashMap<VerseKey, usize>,
    /// Verse positions per (book, chapter), sorted by verse number
    chapters: BTreeMap<(u32, u32), Vec<usize>>,
    books: Vec<Book>,
    /// Lower-cased book names, parallel to `books`
    folded_books: Vec<String>,
    canon: Canon,
    stats: LoadStats,
}

impl ScriptureIndex {
    /// Build the index from loaded verses. Verses keep their source order.
    pub fn build(corpus: LoadedCorpus, canon: Canon) -> Self {
        let LoadedCorpus { verses, stats } = corpus;

        let books = build_books(&verses);
        let folded_books: Vec<String> = books.iter().map(|b| b.name.to_lowercase()).collect();
        let book_slot: HashMap<u32, usize> = books
            .iter()
            .enumerate()
            .map(|(slot, book)| (book.id, slot))
            .collect();

        let mut folded_text = Vec::with_capacity(verses.len());
        let mut verse_book = Vec::with_capacity(verses.len());
        let mut by_key = HashMap::with_capacity(verses.len());
        let mut chapters: BTreeMap<(u32, u32), Vec<usize>> = BTreeMap::new();

        for (pos, verse) in verses.iter().enumerate() {
            folded_text.push(verse.text.to_lowercase());
            verse_book.push(book_slot[&verse.book_id]);
            by_key.entry(verse.key()).or_insert(pos);
            chapters
                .entry((verse.book_id, verse.chapter))
                .or_default()
                .push(pos);
        }

        for positions in chapters.values_mut() {
            positions.sort_by_key(|pos| verses[*pos].verse);
        }

        Self {
            verses,
            folded_text,
            verse_book,
            by_key,
            chapters,
            books,
            folded_books,
            canon,
            stats,
        }
    }

    pub fn empty(canon: Canon) -> Self {
        Self::build(LoadedCorpus::default(), canon)
    }

    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.verses.len()
    }

    /// All verses in source order
    pub fn verses(&self) -> &[Verse] {
        &self.verses
    }

    pub fn canon(&self) -> Canon {
        self.canon
    }

    pub fn stats(&self) -> LoadStats {
        self.stats
    }

    /// All verses of one chapter, ordered by verse number. Empty if absent.
    pub fn chapter(&self, book_id: u32, chapter: u32) -> Vec<&Verse> {
        self.chapters
            .get(&(book_id, chapter))
            .map(|positions| positions.iter().map(|pos| &self.verses[*pos]).collect())
            .unwrap_or_default()
    }

    /// A single verse, or `None` for a reference the corpus does not contain.
    pub fn verse(&self, book_id: u32, chapter: u32, verse: u32) -> Option<&Verse> {
        let key = VerseKey {
            book_id,
            chapter,
            verse,
        };
        self.by_key.get(&key).map(|pos| &self.verses[*pos])
    }

    /// Verse positions in canonical (book, chapter, verse) order
    pub(crate) fn canonical_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.chapters.values().flatten().copied()
    }

    pub(crate) fn verse_at(&self, pos: usize) -> &Verse {
        &self.verses[pos]
    }

    pub(crate) fn folded_text(&self, pos: usize) -> &str {
        &self.folded_text[pos]
    }

    pub(crate) fn folded_book_of(&self, pos: usize) -> &str {
        &self.folded_books[self.verse_book[pos]]
    }
}
