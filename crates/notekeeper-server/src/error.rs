//! Error types for the notes server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Errors the server can answer with.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// No item with this id in the resource.
    #[error("{resource}/{id} not found")]
    NotFound {
        /// Resource name.
        resource: String,
        /// Requested id.
        id: String,
    },

    /// The request body was not usable.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// An item with this id already exists.
    #[error("{resource}/{id} already exists")]
    Conflict {
        /// Resource name.
        resource: String,
        /// Conflicting id.
        id: String,
    },

    /// The database file has the wrong shape.
    #[error("invalid database file: {0}")]
    InvalidDatabase(String),

    /// Reading or writing the database file failed.
    #[error("database file error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::InvalidDatabase(_) | Self::Io(_) | Self::Json(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = Json(serde_json::json!({
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}
