//! Error types for lectio operations

use serde::{Deserialize, Serialize};

/// Structured error payload shared between service and client.
///
/// Used as the HTTP error body in lectio-service and parsed from service
/// responses in the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    pub hint: String,
}

impl ErrorEnvelope {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            hint: hint.into(),
        }
    }

    pub fn bad_request(msg: &str) -> Self {
        Self::new("bad_request", msg, "Check the request parameters")
    }

    pub fn not_found(what: &str) -> Self {
        Self::new(
            "not_found",
            format!("{} not found", what),
            "Check the book, chapter and verse numbers",
        )
    }

    pub fn internal(msg: &str) -> Self {
        Self::new("internal_error", msg, "Check service logs for details")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LectioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(String),

    #[error("Reading plan parse error: {0}")]
    ReadingsParse(String),

    #[error("Scripture data is not loaded")]
    EmptyCorpus,

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid testament '{0}' (expected 'old' or 'new')")]
    InvalidTestament(String),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Service error [{code}]: {message} ({hint})")]
    ServiceError {
        code: String,
        message: String,
        hint: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LectioError {
    /// True for errors caused by caller input rather than server state.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Self::InvalidQuery(_) | Self::InvalidTestament(_) | Self::InvalidReference(_)
        )
    }
}
