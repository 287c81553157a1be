use crate::error::AppError;
use crate::state::SharedState;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use lectio_core::{
    date_seed, parse_date, validate_search_query, Config, LoadStats, Reading, Testament, Verse,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use time::{Date, OffsetDateTime};

fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

// GET /scripture?action=...
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptureParams {
    pub action: Option<String>,
    pub testament: Option<String>,
    pub book_id: Option<String>,
    pub chapter: Option<String>,
    pub verse: Option<String>,
    pub q: Option<String>,
    pub date: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, PartialEq)]
enum ScriptureAction {
    Books,
    TestamentBooks(Testament),
    Chapter { book_id: u32, chapter: u32 },
    Verse { book_id: u32, chapter: u32, verse: u32 },
    Search(String),
    Daily(Date),
    Random,
    Passage { query: String, limit: usize },
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, AppError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::bad_request(format!("Missing required parameter: {}", name)))
}

fn number(value: &Option<String>, name: &str) -> Result<u32, AppError> {
    let raw = required(value, name)?;
    raw.parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| AppError::bad_request(format!("Invalid {} '{}'", name, raw)))
}

impl ScriptureAction {
    /// Validate parameters before the corpus is touched.
    fn from_params(params: &ScriptureParams, config: &Config) -> Result<Self, AppError> {
        let action = required(&params.action, "action")?;
        let parsed = match action {
            "books" => Self::Books,
            "testament-books" => {
                Self::TestamentBooks(required(&params.testament, "testament")?.parse()?)
            }
            "chapter" => Self::Chapter {
                book_id: number(&params.book_id, "bookId")?,
                chapter: number(&params.chapter, "chapter")?,
            },
            "verse" => Self::Verse {
                book_id: number(&params.book_id, "bookId")?,
                chapter: number(&params.chapter, "chapter")?,
                verse: number(&params.verse, "verse")?,
            },
            "search" => {
                let q = params.q.as_deref().unwrap_or_default();
                let q = validate_search_query(q, config.search.min_query_chars)?;
                Self::Search(q.to_string())
            }
            "daily" => Self::Daily(match params.date.as_deref() {
                Some(raw) if !raw.trim().is_empty() => parse_date(raw)?,
                _ => today(),
            }),
            "random" => Self::Random,
            "passage" => {
                let q = required(&params.q, "q")?;
                let limit = match &params.limit {
                    Some(_) => number(&params.limit, "limit")? as usize,
                    None => config.search.passage_verses,
                };
                Self::Passage {
                    query: q.to_string(),
                    limit,
                }
            }
            other => {
                return Err(AppError::bad_request(format!("Invalid action '{}'", other)));
            }
        };
        Ok(parsed)
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Books => "books",
            Self::TestamentBooks(_) => "testament-books",
            Self::Chapter { .. } => "chapter",
            Self::Verse { .. } => "verse",
            Self::Search(_) => "search",
            Self::Daily(_) => "daily",
            Self::Random => "random",
            Self::Passage { .. } => "passage",
        }
    }
}

#[derive(Serialize)]
pub struct SearchResponse<'a> {
    pub query: &'a str,
    pub verses: Vec<&'a Verse>,
}

#[derive(Serialize)]
pub struct DailyResponse<'a> {
    pub date: String,
    pub verse: &'a Verse,
    pub passage: String,
}

#[derive(Serialize)]
pub struct RandomResponse<'a> {
    pub verse: &'a Verse,
    pub passage: String,
}

#[derive(Serialize)]
pub struct PassageResponse<'a> {
    pub query: &'a str,
    pub passage: String,
}

pub async fn scripture(
    State(state): State<SharedState>,
    Query(params): Query<ScriptureParams>,
) -> Result<Response, AppError> {
    let start = Instant::now();
    let action = ScriptureAction::from_params(&params, &state.config)?;
    let index = state.scripture().await?;
    let limits = state.limits();

    let response = match &action {
        ScriptureAction::Books => Json(index.books()).into_response(),
        ScriptureAction::TestamentBooks(testament) => {
            Json(index.books_for_testament(*testament)).into_response()
        }
        ScriptureAction::Chapter { book_id, chapter } => {
            Json(index.chapter(*book_id, *chapter)).into_response()
        }
        ScriptureAction::Verse {
            book_id,
            chapter,
            verse,
        } => {
            let found = index
                .verse(*book_id, *chapter, *verse)
                .ok_or_else(|| AppError::not_found("Verse"))?;
            Json(found).into_response()
        }
        ScriptureAction::Search(query) => Json(SearchResponse {
            query,
            verses: index.search(query, &limits),
        })
        .into_response(),
        ScriptureAction::Daily(date) => {
            let verse = index.daily_verse(*date)?;
            Json(DailyResponse {
                date: date_seed(*date),
                verse,
                passage: verse.to_line(),
            })
            .into_response()
        }
        ScriptureAction::Random => {
            let verse = index.random_verse(None)?;
            Json(RandomResponse {
                verse,
                passage: verse.to_line(),
            })
            .into_response()
        }
        ScriptureAction::Passage { query, limit } => Json(PassageResponse {
            query,
            passage: index.contextual_passage(query, *limit, &limits),
        })
        .into_response(),
    };

    tracing::info!(
        action = action.name(),
        duration_ms = start.elapsed().as_millis() as u64,
        "GET /scripture"
    );
    Ok(response)
}

// GET /readings/today
#[derive(Debug, Default, Deserialize)]
pub struct ReadingDateParams {
    pub date: Option<String>,
}

#[derive(Serialize)]
pub struct ReadingResponse<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub reading: &'a Reading,
    pub passage: String,
}

pub async fn todays_reading(
    State(state): State<SharedState>,
    Query(params): Query<ReadingDateParams>,
) -> Result<Response, AppError> {
    let plan = state
        .readings
        .as_ref()
        .ok_or_else(|| AppError::not_found("Reading plan"))?;
    let date = match params.date.as_deref() {
        Some(raw) if !raw.trim().is_empty() => parse_date(raw)?,
        _ => today(),
    };
    let reading = plan
        .todays_reading(date)
        .ok_or_else(|| AppError::not_found("Reading"))?;

    let index = state.scripture().await?;
    let passage = reading.passage_text(&index)?;
    Ok(Json(ReadingResponse {
        date: Some(date_seed(date)),
        reading,
        passage,
    })
    .into_response())
}

// GET /readings/random
pub async fn random_reading(State(state): State<SharedState>) -> Result<Response, AppError> {
    let reading = state
        .readings
        .as_ref()
        .and_then(|plan| plan.random_reading())
        .ok_or_else(|| AppError::not_found("Reading"))?;

    let index = state.scripture().await?;
    let passage = reading.passage_text(&index)?;
    Ok(Json(ReadingResponse {
        date: None,
        reading,
        passage,
    })
    .into_response())
}

// GET /readings/search
#[derive(Debug, Default, Deserialize)]
pub struct ReadingSearchParams {
    pub q: Option<String>,
}

pub async fn search_readings(
    State(state): State<SharedState>,
    Query(params): Query<ReadingSearchParams>,
) -> Result<Json<Vec<Reading>>, AppError> {
    let q = required(&params.q, "q")?;
    let plan = state
        .readings
        .as_ref()
        .ok_or_else(|| AppError::not_found("Reading plan"))?;
    Ok(Json(plan.search(q).into_iter().cloned().collect()))
}

// GET /status
#[derive(Serialize)]
pub struct StatusResponse {
    pub service: String,
    pub corpus: String,
    pub loaded: bool,
    pub load_attempts: usize,
    pub verses: usize,
    pub books: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<LoadStats>,
    pub readings: usize,
}

pub async fn status(State(state): State<SharedState>) -> Json<StatusResponse> {
    let index = state.store.loaded();
    Json(StatusResponse {
        service: "lectio-service".to_string(),
        corpus: state.store.source().describe(),
        loaded: index.is_some(),
        load_attempts: state.store.load_attempts(),
        verses: index.as_ref().map_or(0, |i| i.len()),
        books: index.as_ref().map_or(0, |i| i.books().len()),
        stats: index.as_ref().map(|i| i.stats()),
        readings: state.readings.as_ref().map_or(0, |p| p.readings().len()),
    })
}
