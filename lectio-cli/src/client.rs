//! HTTP client for lectio-service

use lectio_core::{Book, ErrorEnvelope, LectioError, Reading, Testament, Verse};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use time::Date;

pub struct ServiceClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

#[derive(Deserialize)]
struct SearchResponse {
    verses: Vec<Verse>,
}

#[derive(Deserialize)]
struct VerseResponse {
    verse: Verse,
}

#[derive(Deserialize)]
struct PassageResponse {
    passage: String,
}

#[derive(Deserialize)]
pub struct ReadingResponse {
    pub reading: Reading,
    pub passage: String,
}

impl ServiceClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    pub fn books(&self, testament: Option<Testament>) -> Result<Vec<Book>, LectioError> {
        match testament {
            Some(t) => self.scripture("testament-books", &[("testament", t.as_str().to_string())]),
            None => self.scripture("books", &[]),
        }
    }

    pub fn chapter(&self, book_id: u32, chapter: u32) -> Result<Vec<Verse>, LectioError> {
        self.scripture(
            "chapter",
            &[("bookId", book_id.to_string()), ("chapter", chapter.to_string())],
        )
    }

    pub fn verse(&self, book_id: u32, chapter: u32, verse: u32) -> Result<Verse, LectioError> {
        self.scripture(
            "verse",
            &[
                ("bookId", book_id.to_string()),
                ("chapter", chapter.to_string()),
                ("verse", verse.to_string()),
            ],
        )
    }

    pub fn search(&self, query: &str) -> Result<Vec<Verse>, LectioError> {
        let resp: SearchResponse = self.scripture("search", &[("q", query.to_string())])?;
        Ok(resp.verses)
    }

    pub fn daily(&self, date: Date) -> Result<Verse, LectioError> {
        let resp: VerseResponse =
            self.scripture("daily", &[("date", lectio_core::date_seed(date))])?;
        Ok(resp.verse)
    }

    pub fn random(&self) -> Result<Verse, LectioError> {
        let resp: VerseResponse = self.scripture("random", &[])?;
        Ok(resp.verse)
    }

    pub fn passage(&self, query: &str, limit: usize) -> Result<String, LectioError> {
        let resp: PassageResponse = self.scripture(
            "passage",
            &[("q", query.to_string()), ("limit", limit.to_string())],
        )?;
        Ok(resp.passage)
    }

    pub fn todays_reading(&self, date: Date) -> Result<ReadingResponse, LectioError> {
        self.get("/readings/today", &[("date", lectio_core::date_seed(date))])
    }

    pub fn search_readings(&self, query: &str) -> Result<Vec<Reading>, LectioError> {
        self.get("/readings/search", &[("q", query.to_string())])
    }

    fn scripture<T: DeserializeOwned>(
        &self,
        action: &str,
        params: &[(&str, String)],
    ) -> Result<T, LectioError> {
        let mut query = vec![("action", action.to_string())];
        query.extend(params.iter().cloned());
        self.get("/scripture", &query)
    }

    fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, LectioError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .map_err(|e| LectioError::ServiceError {
                code: "connection_error".to_string(),
                message: e.to_string(),
                hint: "Is lectio-service running?".to_string(),
            })?;

        if !resp.status().is_success() {
            return self.handle_error(resp);
        }

        resp.json::<T>().map_err(|e| LectioError::ServiceError {
            code: "parse_error".to_string(),
            message: e.to_string(),
            hint: "Unexpected response from service".to_string(),
        })
    }

    fn handle_error<T>(&self, resp: reqwest::blocking::Response) -> Result<T, LectioError> {
        let status = resp.status();
        match resp.json::<ErrorEnvelope>() {
            Ok(envelope) => Err(LectioError::ServiceError {
                code: envelope.code,
                message: envelope.message,
                hint: envelope.hint,
            }),
            Err(_) => Err(LectioError::ServiceError {
                code: format!("http_{}", status.as_u16()),
                message: format!("HTTP {} from service", status),
                hint: "Check service logs".to_string(),
            }),
        }
    }
}
