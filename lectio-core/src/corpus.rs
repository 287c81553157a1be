//! Corpus loading: quote-aware row splitting, text normalization, verse parsing.
//!
//! The corpus is a comma-separated table with one header row followed by
//! `book_id,book,chapter,"text",count,verse` rows. The text column may contain
//! commas when quoted, and `""` inside a quoted field is a literal quote.
//! Rows that fail to parse are skipped; a missing or unreadable source yields an
//! empty corpus rather than an error.

use crate::verse::{Verse, VerseKey};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;

/// Where the raw corpus text comes from
#[derive(Debug, Clone)]
pub enum CorpusSource {
    File(PathBuf),
    Inline(String),
}

impl CorpusSource {
    /// Read the raw text. Invalid UTF-8 is replaced rather than rejected.
    pub fn read(&self) -> std::io::Result<String> {
        match self {
            Self::File(path) => {
                let bytes = std::fs::read(path)?;
                Ok(match String::from_utf8(bytes) {
                    Ok(text) => text,
                    Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
                })
            }
            Self::Inline(text) => Ok(text.clone()),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Inline(text) => format!("<inline {} bytes>", text.len()),
        }
    }
}

/// Counters from one load pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    /// Non-blank data rows after the header
    pub rows: usize,
    pub verses: usize,
    pub skipped: usize,
    pub duplicates: usize,
}

/// Result of a load pass: verses in source order plus counters
#[derive(Debug, Clone, Default)]
pub struct LoadedCorpus {
    pub verses: Vec<Verse>,
    pub stats: LoadStats,
}

/// Read and parse `source`, degrading to an empty corpus if it cannot be read.
pub fn load_corpus(source: &CorpusSource) -> LoadedCorpus {
    let text = match source.read() {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(source = %source.describe(), error = %err, "failed to read scripture corpus");
            return LoadedCorpus::default();
        }
    };

    let loaded = parse_corpus(&text);
    tracing::info!(
        source = %source.describe(),
        verses = loaded.stats.verses,
        skipped = loaded.stats.skipped,
        duplicates = loaded.stats.duplicates,
        "loaded scripture corpus"
    );
    loaded
}

/// Parse corpus text. The first line is a header and is always discarded.
pub fn parse_corpus(text: &str) -> LoadedCorpus {
    let rows: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .skip(1)
        .filter(|(_, line)| !line.trim().is_empty())
        .collect();

    // Order-preserving parallel parse; dedup below relies on source order.
    let parsed: Vec<(usize, Option<Verse>)> = rows
        .par_iter()
        .map(|(line_no, line)| (*line_no, parse_row(line)))
        .collect();

    let mut stats = LoadStats {
        rows: rows.len(),
        ..LoadStats::default()
    };
    let mut seen: HashSet<VerseKey> = HashSet::with_capacity(parsed.len());
    let mut verses = Vec::with_capacity(parsed.len());

    for (line_no, verse) in parsed {
        let Some(verse) = verse else {
            tracing::debug!(line = line_no + 1, "skipping malformed corpus row");
            stats.skipped += 1;
            continue;
        };
        if !seen.insert(verse.key()) {
            tracing::debug!(line = line_no + 1, key = %verse.key(), "dropping duplicate verse");
            stats.duplicates += 1;
            continue;
        }
        verses.push(verse);
    }

    stats.verses = verses.len();
    LoadedCorpus { verses, stats }
}

/// Parse one data row into a verse, or `None` if any field is unusable.
pub fn parse_row(line: &str) -> Option<Verse> {
    let fields = split_fields(line)?;
    let [book_id, book, chapter, text, count, verse]: [String; 6] = fields.try_into().ok()?;

    let book_id = parse_positive(&book_id)?;
    let chapter = parse_positive(&chapter)?;
    let verse = parse_positive(&verse)?;

    let book = normalize_text(&book);
    let text = normalize_text(&text);
    if book.is_empty() || text.is_empty() {
        return None;
    }

    Some(Verse {
        book_id,
        book,
        chapter,
        verse,
        text,
        count: count.trim().parse().ok(),
    })
}

fn parse_positive(field: &str) -> Option<u32> {
    field.trim().parse::<u32>().ok().filter(|n| *n > 0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SplitState {
    /// Before the first character of a field
    FieldStart,
    Unquoted,
    Quoted,
    /// Just saw a `"` inside a quoted field: either an escape or the closing quote
    QuoteInQuoted,
    /// Closing quote seen; only whitespace may precede the next comma
    AfterQuoted,
}

/// Split a row on commas that are outside double quotes.
///
/// Returns `None` for an unterminated quote or for text between a closing quote
/// and the next comma.
pub fn split_fields(line: &str) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut state = SplitState::FieldStart;

    for c in line.chars() {
        state = match (state, c) {
            (SplitState::FieldStart, ',') => {
                fields.push(std::mem::take(&mut current));
                SplitState::FieldStart
            }
            (SplitState::FieldStart, '"') => SplitState::Quoted,
            (SplitState::FieldStart, c) if c.is_whitespace() => SplitState::FieldStart,
            (SplitState::Unquoted, ',') => {
                fields.push(std::mem::take(&mut current));
                SplitState::FieldStart
            }
            (SplitState::FieldStart | SplitState::Unquoted, c) => {
                current.push(c);
                SplitState::Unquoted
            }
            (SplitState::Quoted, '"') => SplitState::QuoteInQuoted,
            (SplitState::Quoted, c) => {
                current.push(c);
                SplitState::Quoted
            }
            (SplitState::QuoteInQuoted, '"') => {
                current.push('"');
                SplitState::Quoted
            }
            (SplitState::QuoteInQuoted, ',') | (SplitState::AfterQuoted, ',') => {
                fields.push(std::mem::take(&mut current));
                SplitState::FieldStart
            }
            (SplitState::QuoteInQuoted, c) | (SplitState::AfterQuoted, c)
                if c.is_whitespace() =>
            {
                SplitState::AfterQuoted
            }
            (SplitState::QuoteInQuoted, _) | (SplitState::AfterQuoted, _) => return None,
        };
    }

    if state == SplitState::Quoted {
        return None;
    }
    fields.push(current);
    Some(fields)
}

/// Mis-decoded UTF-8 sequences (read as Windows-1252) and their plain forms.
/// Longer sequences come first so the bare `â€` prefix is only a fallback.
const MOJIBAKE: &[(&str, &str)] = &[
    ("\u{e2}\u{20ac}\u{2122}", "'"),
    ("\u{e2}\u{20ac}\u{2dc}", "'"),
    ("\u{e2}\u{20ac}\u{153}", "\""),
    ("\u{e2}\u{20ac}\u{9d}", "\""),
    ("\u{e2}\u{20ac}\u{201d}", "-"),
    ("\u{e2}\u{20ac}\u{201c}", "-"),
    ("\u{e2}\u{20ac}\u{a6}", "..."),
    ("\u{e2}\u{20ac}", "\""),
    ("\u{c2}\u{a0}", " "),
    ("\u{c2} ", " "),
];

/// Fold encoding artifacts and typographic variants to plain text, collapse
/// whitespace runs and trim.
pub fn normalize_text(raw: &str) -> String {
    let mut text = raw.to_string();
    if !text.is_ascii() {
        for &(from, to) in MOJIBAKE {
            if text.contains(from) {
                text = text.replace(from, to);
            }
        }
        let mut folded = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '\u{2018}' | '\u{2019}' | '\u{201a}' | '\u{2032}' => folded.push('\''),
                '\u{201c}' | '\u{201d}' | '\u{201e}' | '\u{2033}' => folded.push('"'),
                '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2015}' => folded.push('-'),
                '\u{2026}' => folded.push_str("..."),
                '\u{a0}' | '\u{2009}' | '\u{202f}' => folded.push(' '),
                '\u{feff}' | '\u{200b}' => {}
                c => folded.push(c),
            }
        }
        text = folded;
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "book_id,book,chapter,text,count,verse";

    #[test]
    fn test_split_plain_fields() {
        assert_eq!(
            split_fields("1,Genesis,1,text,5,1").unwrap(),
            vec!["1", "Genesis", "1", "text", "5", "1"]
        );
    }

    #[test]
    fn test_split_keeps_commas_inside_quotes() {
        let fields = split_fields(r#"1,Genesis,1,"And God said, Let there be light: and there was light.",0,3"#)
            .unwrap();
        assert_eq!(fields.len(), 6);
        assert_eq!(
            fields[3],
            "And God said, Let there be light: and there was light."
        );
    }

    #[test]
    fn test_split_unescapes_doubled_quotes() {
        let fields = split_fields(r#"1,Genesis,1,"He said, ""Go"", and went",0,1"#).unwrap();
        assert_eq!(fields[3], r#"He said, "Go", and went"#);
    }

    #[test]
    fn test_split_empty_fields() {
        assert_eq!(split_fields(",,").unwrap(), vec!["", "", ""]);
    }

    #[test]
    fn test_split_rejects_unterminated_quote() {
        assert!(split_fields(r#"1,Genesis,1,"never closed,0,1"#).is_none());
    }

    #[test]
    fn test_split_rejects_text_after_closing_quote() {
        assert!(split_fields(r#"1,Genesis,1,"closed"junk,0,1"#).is_none());
    }

    #[test]
    fn test_split_tolerates_space_around_quoted_field() {
        let fields = split_fields(r#"1,Genesis,1, "spaced" ,0,1"#).unwrap();
        assert_eq!(fields[3], "spaced");
        assert_eq!(fields.len(), 6);
    }

    #[test]
    fn test_normalize_mojibake_and_typography() {
        assert_eq!(normalize_text("the LORD\u{e2}\u{20ac}\u{2122}s house"), "the LORD's house");
        assert_eq!(normalize_text("\u{201c}Fear not\u{201d}"), "\"Fear not\"");
        assert_eq!(normalize_text("light\u{2014}and"), "light-and");
        assert_eq!(normalize_text("and so\u{2026}"), "and so...");
        assert_eq!(normalize_text("a\u{a0}b"), "a b");
        assert_eq!(normalize_text("\u{feff}In the"), "In the");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize_text("  In   the\tbeginning \n "), "In the beginning");
    }

    #[test]
    fn test_normalize_keeps_other_unicode() {
        assert_eq!(normalize_text("Ps\u{e1}lm"), "Ps\u{e1}lm");
    }

    #[test]
    fn test_parse_row_fields() {
        let verse = parse_row(r#"43,John,3,"For God so loved the world, that he gave",120,16"#).unwrap();
        assert_eq!(verse.book_id, 43);
        assert_eq!(verse.book, "John");
        assert_eq!(verse.chapter, 3);
        assert_eq!(verse.verse, 16);
        assert_eq!(verse.count, Some(120));
        assert_eq!(verse.text, "For God so loved the world, that he gave");
    }

    #[test]
    fn test_parse_row_rejects_invalid_rows() {
        assert!(parse_row("43,John,3,text,1").is_none());
        assert!(parse_row("x,John,3,text,1,16").is_none());
        assert!(parse_row("43,John,0,text,1,16").is_none());
        assert!(parse_row(r#"43,John,3,"   ",1,16"#).is_none());
        assert!(parse_row(r#"43, ,3,"text",1,16"#).is_none());
    }

    #[test]
    fn test_parse_corpus_skips_header_and_bad_rows() {
        let text = format!(
            "{HEADER}\n1,Genesis,1,\"In the beginning God created the heaven and the earth.\",0,1\n\nbroken row\n1,Genesis,1,\"And the earth was without form\",0,2\n"
        );
        let loaded = parse_corpus(&text);
        assert_eq!(loaded.verses.len(), 2);
        assert_eq!(loaded.stats.rows, 3);
        assert_eq!(loaded.stats.skipped, 1);
        assert_eq!(loaded.verses[1].verse, 2);
    }

    #[test]
    fn test_parse_corpus_drops_duplicates_keeping_first() {
        let text = format!("{HEADER}\n1,Genesis,1,\"first\",0,1\n1,Genesis,1,\"second\",0,1\n");
        let loaded = parse_corpus(&text);
        assert_eq!(loaded.verses.len(), 1);
        assert_eq!(loaded.verses[0].text, "first");
        assert_eq!(loaded.stats.duplicates, 1);
    }

    #[test]
    fn test_parse_corpus_handles_crlf() {
        let text = format!("{HEADER}\r\n1,Genesis,1,\"In the beginning\",0,1\r\n");
        let loaded = parse_corpus(&text);
        assert_eq!(loaded.verses.len(), 1);
        assert_eq!(loaded.verses[0].verse, 1);
    }

    #[test]
    fn test_parse_corpus_header_only() {
        assert!(parse_corpus(HEADER).verses.is_empty());
        assert!(parse_corpus("").verses.is_empty());
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_corpus(&CorpusSource::File(dir.path().join("missing.csv")));
        assert!(loaded.verses.is_empty());
        assert_eq!(loaded.stats, LoadStats::default());
    }

    #[test]
    fn test_load_file_with_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kjv.csv");
        let mut bytes = format!("{HEADER}\n1,Genesis,1,\"In the beginning").into_bytes();
        bytes.push(0xff);
        bytes.extend_from_slice(b"\",0,1\n");
        std::fs::write(&path, bytes).unwrap();

        let loaded = load_corpus(&CorpusSource::File(path));
        assert_eq!(loaded.verses.len(), 1);
        assert!(loaded.verses[0].text.starts_with("In the beginning"));
    }
}
