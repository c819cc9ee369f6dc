use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::models::Envelope;

/// Error taxonomy shared by the repository and the HTTP layer.
///
/// The API layer is the only place these are translated into HTTP
/// statuses; everything below it propagates the typed value.
#[derive(Debug, Error)]
pub enum TodoError {
    /// Client-supplied data failed a business rule.
    #[error("{0}")]
    Validation(String),
    /// Well-formed request, no matching record.
    #[error("Todo not found")]
    NotFound,
    /// Store connectivity or query failure.
    #[error("{0}")]
    Store(String),
}

impl TodoError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<rusqlite::Error> for TodoError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Store(err.to_string())
    }
}

impl IntoResponse for TodoError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(Envelope::<()>::err(self.to_string()))).into_response()
    }
}
