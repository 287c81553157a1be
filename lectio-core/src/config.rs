//! Configuration for lectio

use crate::LectioError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Last book id of the Old Testament in the 66-book canon (Malachi).
pub const OLD_TESTAMENT_LAST_BOOK: u32 = 39;

/// Default configuration as TOML
pub const DEFAULT_CONFIG: &str = r#"# Lectio Configuration

[corpus]
# Verse corpus: header row, then book_id,book,chapter,"text",count,verse
path = "data/kjv.csv"

[canon]
# Books with an id up to and including this value are Old Testament
old_testament_last_book = 39

[search]
# Maximum verses returned by a free-text search
result_limit = 50
# Maximum verses returned for chapter shorthand such as "psalm 23"
chapter_preview_limit = 20
# Queries shorter than this are rejected before searching
min_query_chars = 2
# Verses included in a contextual passage
passage_verses = 5

[readings]
# Optional curated reading plan ([[reading]] entries)
# path = "data/readings.toml"

[service]
bind = "127.0.0.1"
port = 3000
"#;

/// Lectio configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub canon: CanonConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub readings: ReadingsConfig,
    #[serde(default)]
    pub service: ServiceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    #[serde(default = "default_corpus_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonConfig {
    #[serde(default = "default_old_testament_last_book")]
    pub old_testament_last_book: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,
    #[serde(default = "default_chapter_preview_limit")]
    pub chapter_preview_limit: usize,
    #[serde(default = "default_min_query_chars")]
    pub min_query_chars: usize,
    #[serde(default = "default_passage_verses")]
    pub passage_verses: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReadingsConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

// Default value functions
fn default_corpus_path() -> PathBuf {
    PathBuf::from("data/kjv.csv")
}
fn default_old_testament_last_book() -> u32 {
    OLD_TESTAMENT_LAST_BOOK
}
fn default_result_limit() -> usize {
    50
}
fn default_chapter_preview_limit() -> usize {
    20
}
fn default_min_query_chars() -> usize {
    2
}
fn default_passage_verses() -> usize {
    5
}
fn default_bind() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    3000
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            path: default_corpus_path(),
        }
    }
}

impl Default for CanonConfig {
    fn default() -> Self {
        Self {
            old_testament_last_book: default_old_testament_last_book(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            result_limit: default_result_limit(),
            chapter_preview_limit: default_chapter_preview_limit(),
            min_query_chars: default_min_query_chars(),
            passage_verses: default_passage_verses(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse config from TOML string
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| LectioError::ConfigParse(e.to_string()))
    }

    /// Load `path` if given, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> crate::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = Config::from_toml(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.corpus.path, PathBuf::from("data/kjv.csv"));
        assert_eq!(config.canon.old_testament_last_book, 39);
        assert_eq!(config.search.result_limit, 50);
        assert_eq!(config.search.chapter_preview_limit, 20);
        assert_eq!(config.search.min_query_chars, 2);
        assert!(config.readings.path.is_none());
        assert_eq!(config.service.port, 3000);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config = Config::from_toml("[search]\nresult_limit = 10\n").unwrap();
        assert_eq!(config.search.result_limit, 10);
        assert_eq!(config.search.chapter_preview_limit, 20);
        assert_eq!(config.service.bind, "127.0.0.1");
    }

    #[test]
    fn test_invalid_config_is_parse_error() {
        let err = Config::from_toml("[search]\nresult_limit = \"many\"\n").unwrap_err();
        assert!(matches!(err, LectioError::ConfigParse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lectio.toml");
        std::fs::write(&path, "[canon]\nold_testament_last_book = 46\n").unwrap();
        let config = Config::load_or_default(Some(&path)).unwrap();
        assert_eq!(config.canon.old_testament_last_book, 46);
    }
}
