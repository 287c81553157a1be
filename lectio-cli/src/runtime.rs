//! Runs scripture operations against the local corpus or a remote service.

#[cfg(feature = "service")]
use crate::client::ServiceClient;
use lectio_core::{
    validate_search_query, Book, Config, LectioError, Reading, ReadingPlan, ScriptureIndex,
    ScriptureStore, SearchLimits, Testament, Verse,
};
use std::sync::Arc;
use time::Date;

enum Backend {
    Local(ScriptureStore),
    #[cfg(feature = "service")]
    Service(ServiceClient),
}

pub struct Runtime {
    config: Config,
    backend: Backend,
}

impl Runtime {
    pub fn new(config: Config, service_url: Option<&str>) -> lectio_core::Result<Self> {
        let backend = match service_url {
            #[cfg(feature = "service")]
            Some(url) => Backend::Service(ServiceClient::new(url)),
            #[cfg(not(feature = "service"))]
            Some(_) => {
                return Err(LectioError::InvalidQuery(
                    "built without service support; drop --service-url".to_string(),
                ))
            }
            None => Backend::Local(ScriptureStore::from_config(&config)),
        };
        Ok(Self { config, backend })
    }

    fn limits(&self) -> SearchLimits {
        SearchLimits::from(&self.config.search)
    }

    pub fn books(&self, testament: Option<Testament>) -> lectio_core::Result<Vec<Book>> {
        match &self.backend {
            Backend::Local(store) => {
                let index = store.index();
                Ok(match testament {
                    Some(t) => index.books_for_testament(t).into_iter().cloned().collect(),
                    None => index.books().to_vec(),
                })
            }
            #[cfg(feature = "service")]
            Backend::Service(client) => client.books(testament),
        }
    }

    pub fn chapter(&self, book: &str, chapter: u32) -> lectio_core::Result<Vec<Verse>> {
        let book_id = self.book_id(book)?;
        match &self.backend {
            Backend::Local(store) => Ok(owned(store.index().chapter(book_id, chapter))),
            #[cfg(feature = "service")]
            Backend::Service(client) => client.chapter(book_id, chapter),
        }
    }

    pub fn verse(&self, book: &str, chapter: u32, verse: u32) -> lectio_core::Result<Verse> {
        let book_id = self.book_id(book)?;
        match &self.backend {
            Backend::Local(store) => store
                .index()
                .verse(book_id, chapter, verse)
                .cloned()
                .ok_or_else(|| LectioError::NotFound(format!("{} {}:{}", book, chapter, verse))),
            #[cfg(feature = "service")]
            Backend::Service(client) => client.verse(book_id, chapter, verse),
        }
    }

    pub fn search(&self, query: &str) -> lectio_core::Result<Vec<Verse>> {
        let query = validate_search_query(query, self.config.search.min_query_chars)?;
        match &self.backend {
            Backend::Local(store) => Ok(owned(store.index().search(query, &self.limits()))),
            #[cfg(feature = "service")]
            Backend::Service(client) => client.search(query),
        }
    }

    pub fn daily(&self, date: Date) -> lectio_core::Result<Verse> {
        match &self.backend {
            Backend::Local(store) => store.index().daily_verse(date).cloned(),
            #[cfg(feature = "service")]
            Backend::Service(client) => client.daily(date),
        }
    }

    pub fn random(&self) -> lectio_core::Result<Verse> {
        match &self.backend {
            Backend::Local(store) => store.index().random_verse(None).cloned(),
            #[cfg(feature = "service")]
            Backend::Service(client) => client.random(),
        }
    }

    pub fn passage(&self, query: &str, limit: Option<usize>) -> lectio_core::Result<String> {
        let limit = limit.unwrap_or(self.config.search.passage_verses);
        match &self.backend {
            Backend::Local(store) => {
                Ok(store.index().contextual_passage(query, limit, &self.limits()))
            }
            #[cfg(feature = "service")]
            Backend::Service(client) => client.passage(query, limit),
        }
    }

    /// Today's plan entry and its passage text.
    pub fn todays_reading(&self, date: Date) -> lectio_core::Result<(Reading, String)> {
        match &self.backend {
            Backend::Local(store) => {
                let plan = self.reading_plan()?;
                let reading = plan
                    .todays_reading(date)
                    .ok_or_else(|| LectioError::NotFound("Reading".to_string()))?;
                let passage = reading.passage_text(&store.index())?;
                Ok((reading.clone(), passage))
            }
            #[cfg(feature = "service")]
            Backend::Service(client) => {
                let resp = client.todays_reading(date)?;
                Ok((resp.reading, resp.passage))
            }
        }
    }

    pub fn search_readings(&self, query: &str) -> lectio_core::Result<Vec<Reading>> {
        match &self.backend {
            Backend::Local(_) => Ok(self
                .reading_plan()?
                .search(query)
                .into_iter()
                .cloned()
                .collect()),
            #[cfg(feature = "service")]
            Backend::Service(client) => client.search_readings(query),
        }
    }

    fn reading_plan(&self) -> lectio_core::Result<ReadingPlan> {
        match &self.config.readings.path {
            Some(path) => ReadingPlan::load(path),
            None => Err(LectioError::NotFound("Reading plan".to_string())),
        }
    }

    fn book_id(&self, book: &str) -> lectio_core::Result<u32> {
        if let Ok(id) = book.trim().parse::<u32>() {
            return Ok(id);
        }
        let books = self.books(None)?;
        resolve_book_arg(book, &books)
            .ok_or_else(|| LectioError::InvalidReference(format!("unknown book '{}'", book)))
    }

    /// Loaded local index, if running without a service.
    pub fn local_index(&self) -> Option<Arc<ScriptureIndex>> {
        match &self.backend {
            Backend::Local(store) => Some(store.index()),
            #[cfg(feature = "service")]
            Backend::Service(_) => None,
        }
    }
}

fn owned(verses: Vec<&Verse>) -> Vec<Verse> {
    verses.into_iter().cloned().collect()
}

/// Book id for a CLI argument: exact name first, then the lowest-id book
/// whose name contains the argument.
pub fn resolve_book_arg(arg: &str, books: &[Book]) -> Option<u32> {
    let wanted = arg.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    if wanted.is_empty() {
        return None;
    }
    if let Some(book) = books.iter().find(|b| b.name.to_lowercase() == wanted) {
        return Some(book.id);
    }
    books
        .iter()
        .filter(|b| b.name.to_lowercase().contains(&wanted))
        .map(|b| b.id)
        .min()
}
