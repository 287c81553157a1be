use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lectio_core::{ErrorEnvelope, LectioError};

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub body: ErrorEnvelope,
}

impl AppError {
    pub fn bad_request(msg: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorEnvelope::bad_request(&msg.to_string()),
        }
    }

    pub fn not_found(what: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: ErrorEnvelope::not_found(what),
        }
    }

    pub fn corpus_unavailable() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorEnvelope::new(
                "corpus_unavailable",
                LectioError::EmptyCorpus.to_string(),
                "Check the corpus path in the service configuration",
            ),
        }
    }

    pub fn internal(msg: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorEnvelope::internal(&msg.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(code = %self.body.code, message = %self.body.message, "request failed");
        }
        (self.status, axum::Json(self.body)).into_response()
    }
}

impl From<LectioError> for AppError {
    fn from(err: LectioError) -> Self {
        match &err {
            LectioError::EmptyCorpus => AppError::corpus_unavailable(),
            LectioError::NotFound(what) => AppError::not_found(what),
            _ if err.is_usage() => AppError::bad_request(err),
            _ => AppError::internal(err),
        }
    }
}
