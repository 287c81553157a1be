//! Curated topical reading plan.
//!
//! Plans are TOML files with one `[[reading]]` table per entry. Today's reading
//! cycles through the plan by day of year.

use crate::index::ScriptureIndex;
use crate::verse::{format_passage, Verse, NO_VERSES_FOUND};
use crate::LectioError;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::path::Path;
use time::Date;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    pub id: u32,
    pub topic: String,
    pub book: String,
    pub chapter: u32,
    /// Single verse ("10") or inclusive range ("6-11")
    pub verses: String,
    /// Inline passage text; resolved from the corpus when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflection: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Reading {
    /// Inclusive verse range named by `verses`
    pub fn verse_range(&self) -> crate::Result<(u32, u32)> {
        let invalid = || LectioError::InvalidReference(format!("bad verse range '{}'", self.verses));
        let parse = |s: &str| s.trim().parse::<u32>().ok().filter(|n| *n > 0);

        let (start, end) = match self.verses.split_once('-') {
            Some((start, end)) => (parse(start).ok_or_else(invalid)?, parse(end).ok_or_else(invalid)?),
            None => {
                let single = parse(&self.verses).ok_or_else(invalid)?;
                (single, single)
            }
        };
        if start > end {
            return Err(invalid());
        }
        Ok((start, end))
    }

    /// e.g. "Proverbs 6:6-11"
    pub fn reference(&self) -> String {
        format!("{} {}:{}", self.book, self.chapter, self.verses)
    }

    /// Verses of this reading found in the corpus. Unknown books yield nothing.
    pub fn passage<'a>(&self, index: &'a ScriptureIndex) -> crate::Result<Vec<&'a Verse>> {
        let (start, end) = self.verse_range()?;
        let Some(book) = index.book_by_name(&self.book) else {
            return Ok(Vec::new());
        };
        Ok(index
            .chapter(book.id, self.chapter)
            .into_iter()
            .filter(|v| (start..=end).contains(&v.verse))
            .collect())
    }

    /// Inline text when present, otherwise the passage resolved from the corpus.
    pub fn passage_text(&self, index: &ScriptureIndex) -> crate::Result<String> {
        if let Some(text) = &self.text {
            return Ok(format!("{} - {}", self.reference(), text));
        }
        let verses = self.passage(index)?;
        if verses.is_empty() {
            return Ok(NO_VERSES_FOUND.to_string());
        }
        Ok(format_passage(verses))
    }

    fn matches(&self, term: &str) -> bool {
        self.topic.to_lowercase().contains(term)
            || self.book.to_lowercase().contains(term)
            || self.keywords.iter().any(|k| k.to_lowercase().contains(term))
    }
}

#[derive(Debug, Default, Deserialize)]
struct PlanFile {
    #[serde(default, rename = "reading")]
    readings: Vec<Reading>,
}

#[derive(Debug, Clone, Default)]
pub struct ReadingPlan {
    readings: Vec<Reading>,
}

impl ReadingPlan {
    pub fn new(readings: Vec<Reading>) -> Self {
        Self { readings }
    }

    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| match e {
            LectioError::ReadingsParse(msg) => {
                LectioError::ReadingsParse(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let file: PlanFile =
            toml::from_str(content).map_err(|e| LectioError::ReadingsParse(e.to_string()))?;
        for reading in &file.readings {
            reading.verse_range()?;
        }
        Ok(Self::new(file.readings))
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Reading for `date`: position `(day_of_year - 1) mod len`.
    pub fn todays_reading(&self, date: Date) -> Option<&Reading> {
        if self.readings.is_empty() {
            return None;
        }
        let day = usize::from(date.ordinal()) - 1;
        Some(&self.readings[day % self.readings.len()])
    }

    pub fn random_reading(&self) -> Option<&Reading> {
        self.readings.choose(&mut rand::thread_rng())
    }

    /// Case-insensitive substring match over topic, book and keywords.
    pub fn search(&self, query: &str) -> Vec<&Reading> {
        let term = query.trim().to_lowercase();
        self.readings.iter().filter(|r| r.matches(&term)).collect()
    }
}
