//! Load-once scripture store.
//!
//! The store owns a corpus source and builds the [`ScriptureIndex`] on first
//! access. Loaders serialize on a guard mutex and re-check, so a single parse
//! pass populates the shared index and everyone receives the same `Arc`. The
//! finished index is published through a `OnceLock`, so checking for it never
//! waits on a load in progress. An empty load is handed out but not kept, so a
//! later call retries.

use crate::config::Config;
use crate::corpus::{load_corpus, CorpusSource};
use crate::index::ScriptureIndex;
use crate::verse::Canon;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

pub struct ScriptureStore {
    source: CorpusSource,
    canon: Canon,
    loaded: OnceLock<Arc<ScriptureIndex>>,
    /// Held for the duration of a parse pass
    load_guard: Mutex<()>,
    load_attempts: AtomicUsize,
}

impl ScriptureStore {
    pub fn new(source: CorpusSource, canon: Canon) -> Self {
        Self {
            source,
            canon,
            loaded: OnceLock::new(),
            load_guard: Mutex::new(()),
            load_attempts: AtomicUsize::new(0),
        }
    }

    /// Store reading the corpus file and canon named in `config`
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            CorpusSource::File(config.corpus.path.clone()),
            Canon::new(config.canon.old_testament_last_book),
        )
    }

    pub fn source(&self) -> &CorpusSource {
        &self.source
    }

    /// The index if it has already been loaded. Never blocks.
    pub fn loaded(&self) -> Option<Arc<ScriptureIndex>> {
        self.loaded.get().map(Arc::clone)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.get().is_some()
    }

    /// Number of parse passes run so far
    pub fn load_attempts(&self) -> usize {
        self.load_attempts.load(Ordering::Relaxed)
    }

    /// Get the index, loading it on first use. Never fails: an unreadable corpus
    /// produces an empty index.
    pub fn index(&self) -> Arc<ScriptureIndex> {
        if let Some(index) = self.loaded() {
            return index;
        }

        // A poisoned guard only means a loader panicked; nothing was published.
        let _guard = self.load_guard.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(index) = self.loaded() {
            return index;
        }

        self.load_attempts.fetch_add(1, Ordering::Relaxed);
        let index = Arc::new(ScriptureIndex::build(load_corpus(&self.source), self.canon));
        if index.is_empty() {
            tracing::warn!(source = %self.source.describe(), "scripture corpus is empty; will retry on next access");
            return index;
        }
        Arc::clone(self.loaded.get_or_init(|| index))
    }
}
