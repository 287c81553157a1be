//! Free-text search with reference shorthand.
//!
//! A query is tried, in order, as a verse reference (`john 3:16`), a chapter
//! reference (`psalm 23`) and finally as text. References whose book cannot be
//! resolved, and chapter references to an empty chapter, fall through to text
//! search. Text results come back in canonical reading order, not by score.

use crate::config::SearchConfig;
use crate::corpus::normalize_text;
use crate::index::ScriptureIndex;
use crate::verse::{format_passage, Verse, NO_VERSES_FOUND};
use crate::LectioError;
use regex::Regex;
use std::sync::OnceLock;

/// Quote characters stripped from the ends of search tokens
const TOKEN_QUOTES: &[char] = &['"', '\''];

static REFERENCE_RE: OnceLock<Regex> = OnceLock::new();

fn reference_re() -> &'static Regex {
    REFERENCE_RE.get_or_init(|| {
        Regex::new(
            r"^(?P<book>(?:[1-3]\s*)?[a-z][a-z.' ]*?)\s*(?P<chapter>\d+)(?:\s*:\s*(?P<verse>\d+))?$",
        )
        .expect("reference pattern is valid")
    })
}

/// Result caps applied by [`ScriptureIndex::search`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub result_limit: usize,
    pub chapter_preview_limit: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            result_limit: 50,
            chapter_preview_limit: 20,
        }
    }
}

impl From<&SearchConfig> for SearchLimits {
    fn from(config: &SearchConfig) -> Self {
        Self {
            result_limit: config.result_limit,
            chapter_preview_limit: config.chapter_preview_limit,
        }
    }
}

/// Reference shorthand parsed from a lower-cased query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub book: String,
    pub chapter: u32,
    pub verse: Option<u32>,
}

impl Reference {
    /// Parse `<book words><chapter>[:<verse>]`, whitespace-insensitive.
    pub fn parse(query: &str) -> Option<Self> {
        let caps = reference_re().captures(query.trim())?;
        let chapter = caps["chapter"].parse().ok()?;
        let verse = match caps.name("verse") {
            Some(m) => Some(m.as_str().parse().ok()?),
            None => None,
        };
        Some(Self {
            book: caps["book"].trim().to_string(),
            chapter,
            verse,
        })
    }
}

/// Text portion of a query after reference handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextQuery {
    /// Whole query was wrapped in double quotes: substring match on verse text
    Phrase(String),
    /// Every term must occur in the verse text or book name
    Terms(Vec<String>),
}

impl TextQuery {
    pub fn parse(query: &str) -> Self {
        let query = query.trim();
        if let Some(inner) = query.strip_prefix('"').and_then(|q| q.strip_suffix('"')) {
            return Self::Phrase(inner.trim().to_lowercase());
        }

        let terms = query
            .split_whitespace()
            .map(|token| token.trim_matches(TOKEN_QUOTES).to_lowercase())
            .filter(|token| token.chars().count() > 1)
            .collect();
        Self::Terms(terms)
    }

    fn is_empty(&self) -> bool {
        match self {
            Self::Phrase(phrase) => phrase.is_empty(),
            Self::Terms(terms) => terms.is_empty(),
        }
    }
}

/// Reject queries too short to search, before any search runs.
pub fn validate_search_query(query: &str, min_chars: usize) -> crate::Result<&str> {
    let trimmed = query.trim();
    if trimmed.chars().count() < min_chars {
        return Err(LectioError::InvalidQuery(format!(
            "search query must be at least {} characters",
            min_chars
        )));
    }
    Ok(trimmed)
}

impl ScriptureIndex {
    /// Search by reference shorthand or text. Empty queries return nothing.
    pub fn search(&self, query: &str, limits: &SearchLimits) -> Vec<&Verse> {
        let normalized = normalize_text(query).to_lowercase();
        if normalized.is_empty() {
            return Vec::new();
        }

        if let Some(reference) = Reference::parse(&normalized) {
            if let Some(book) = self.resolve_book(&reference.book) {
                match reference.verse {
                    Some(verse) => {
                        return self
                            .verse(book.id, reference.chapter, verse)
                            .into_iter()
                            .collect();
                    }
                    None => {
                        let mut verses = self.chapter(book.id, reference.chapter);
                        if !verses.is_empty() {
                            verses.truncate(limits.chapter_preview_limit);
                            return verses;
                        }
                    }
                }
            }
        }

        self.text_search(&TextQuery::parse(&normalized), limits.result_limit)
    }

    /// Text matching in canonical (book, chapter, verse) order, capped at `limit`.
    pub fn text_search(&self, query: &TextQuery, limit: usize) -> Vec<&Verse> {
        if query.is_empty() {
            return Vec::new();
        }

        // Chapter map iterates in (book, chapter) order with verses pre-sorted,
        // so the first `limit` hits are already in reading order.
        self.canonical_positions()
            .filter(|pos| self.matches(*pos, query))
            .take(limit)
            .map(|pos| self.verse_at(pos))
            .collect()
    }

    fn matches(&self, pos: usize, query: &TextQuery) -> bool {
        let text = self.folded_text(pos);
        match query {
            TextQuery::Phrase(phrase) => text.contains(phrase.as_str()),
            TextQuery::Terms(terms) => {
                let book = self.folded_book_of(pos);
                terms
                    .iter()
                    .all(|term| text.contains(term.as_str()) || book.contains(term.as_str()))
            }
        }
    }

    /// First `count` search hits as a plain-text passage for prompt building.
    pub fn contextual_passage(&self, query: &str, count: usize, limits: &SearchLimits) -> String {
        let verses = self.search(query, limits);
        if verses.is_empty() {
            return NO_VERSES_FOUND.to_string();
        }
        format_passage(verses.into_iter().take(count))
    }
}
