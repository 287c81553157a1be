//! Verse and book data model

use crate::config::OLD_TESTAMENT_LAST_BOOK;
use crate::LectioError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

/// Passage text used when a retrieval finds nothing.
pub const NO_VERSES_FOUND: &str = "No relevant verses found.";

/// A single verse of the corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verse {
    pub book_id: u32,
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
    /// Auxiliary column carried over from the corpus, unused by queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

impl Verse {
    pub fn key(&self) -> VerseKey {
        VerseKey {
            book_id: self.book_id,
            chapter: self.chapter,
            verse: self.verse,
        }
    }

    /// `"{book} {chapter}:{verse}"`
    pub fn reference(&self) -> String {
        format!("{} {}:{}", self.book, self.chapter, self.verse)
    }

    /// `"{book} {chapter}:{verse} - {text}"`, the line format prompt builders concatenate.
    pub fn to_line(&self) -> String {
        format!("{} - {}", self.reference(), self.text)
    }
}

/// Canonical position of a verse; orders as (book, chapter, verse).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VerseKey {
    pub book_id: u32,
    pub chapter: u32,
    pub verse: u32,
}

impl Display for VerseKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}:{}", self.book_id, self.chapter, self.verse)
    }
}

/// A book derived from the verse table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: u32,
    pub name: String,
    /// Distinct chapter numbers, ascending
    pub chapters: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Testament {
    Old,
    New,
}

impl Testament {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Old => "old",
            Self::New => "new",
        }
    }
}

impl FromStr for Testament {
    type Err = LectioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "old" => Ok(Self::Old),
            "new" => Ok(Self::New),
            _ => Err(LectioError::InvalidTestament(s.to_string())),
        }
    }
}

/// Numeric testament split over book ids.
///
/// Books `1..=old_testament_last_book` are Old Testament, everything after is New.
/// The split encodes a particular canon ordering; corpora using a different
/// ordering configure their own boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canon {
    pub old_testament_last_book: u32,
}

impl Default for Canon {
    fn default() -> Self {
        Self {
            old_testament_last_book: OLD_TESTAMENT_LAST_BOOK,
        }
    }
}

impl Canon {
    pub fn new(old_testament_last_book: u32) -> Self {
        Self {
            old_testament_last_book,
        }
    }

    pub fn testament_of(&self, book_id: u32) -> Testament {
        if book_id <= self.old_testament_last_book {
            Testament::Old
        } else {
            Testament::New
        }
    }
}

/// Join verses into a plain-text passage, one verse line per paragraph.
pub fn format_passage<'a>(verses: impl IntoIterator<Item = &'a Verse>) -> String {
    verses
        .into_iter()
        .map(Verse::to_line)
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn john_3_16() -> Verse {
        Verse {
            book_id: 43,
            book: "John".to_string(),
            chapter: 3,
            verse: 16,
            text: "For God so loved the world".to_string(),
            count: None,
        }
    }

    #[test]
    fn test_verse_line_format() {
        assert_eq!(john_3_16().to_line(), "John 3:16 - For God so loved the world");
    }

    #[test]
    fn test_verse_serializes_camel_case() {
        let json = serde_json::to_value(john_3_16()).unwrap();
        assert_eq!(json["bookId"], 43);
        assert!(json.get("count").is_none());
    }

    #[test]
    fn test_testament_parse() {
        assert_eq!("OLD".parse::<Testament>().unwrap(), Testament::Old);
        assert_eq!(" new ".parse::<Testament>().unwrap(), Testament::New);
        assert!(matches!(
            "apocrypha".parse::<Testament>(),
            Err(LectioError::InvalidTestament(_))
        ));
    }

    #[test]
    fn test_canon_boundary() {
        let canon = Canon::default();
        assert_eq!(canon.testament_of(1), Testament::Old);
        assert_eq!(canon.testament_of(39), Testament::Old);
        assert_eq!(canon.testament_of(40), Testament::New);
        assert_eq!(canon.testament_of(66), Testament::New);
    }

    #[test]
    fn test_format_passage_joins_with_blank_line() {
        let mut second = john_3_16();
        second.verse = 17;
        second.text = "For God sent not his Son".to_string();
        let passage = format_passage(&[john_3_16(), second]);
        assert_eq!(
            passage,
            "John 3:16 - For God so loved the world\n\nJohn 3:17 - For God sent not his Son"
        );
    }

    #[test]
    fn test_verse_keys_order_canonically() {
        let a = VerseKey { book_id: 1, chapter: 2, verse: 1 };
        let b = VerseKey { book_id: 1, chapter: 10, verse: 1 };
        let c = VerseKey { book_id: 2, chapter: 1, verse: 1 };
        assert!(a < b && b < c);
    }
}
