//! Lectio Core - In-memory scripture retrieval
//!
//! This library loads a tabular verse corpus once, indexes it in memory, and
//! answers reference lookups, chapter listings, free-text searches and
//! deterministic verse-of-the-day selection.

pub mod config;
pub mod corpus;
pub mod daily;
pub mod error;
pub mod index;
pub mod readings;
pub mod search;
pub mod store;
pub mod verse;

pub use config::{Config, OLD_TESTAMENT_LAST_BOOK};
pub use corpus::{CorpusSource, LoadStats, LoadedCorpus};
pub use daily::{date_seed, parse_date, seed_hash};
pub use error::{ErrorEnvelope, LectioError};
pub use index::ScriptureIndex;
pub use readings::{Reading, ReadingPlan};
pub use search::{validate_search_query, Reference, SearchLimits, TextQuery};
pub use store::ScriptureStore;
pub use verse::{format_passage, Book, Canon, Testament, Verse, VerseKey, NO_VERSES_FOUND};

/// Result type alias for lectio operations
pub type Result<T> = std::result::Result<T, LectioError>;
