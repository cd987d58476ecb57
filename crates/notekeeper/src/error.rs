//! Error types for notekeeper.
//!
//! This module defines all error types used throughout the notekeeper crate,
//! along with the messages shown to the user when an action fails.

use std::path::PathBuf;
use thiserror::Error;

use crate::note::NoteId;

/// The main error type for notekeeper operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// A value was larger than the store accepts.
    #[error("storage quota exceeded for '{key}': {size} bytes (limit {limit})")]
    QuotaExceeded {
        /// Key being written.
        key: String,
        /// Size of the rejected value in bytes.
        size: usize,
        /// Maximum value size in bytes.
        limit: usize,
    },

    /// A mutex guarding the store was poisoned by a panicking thread.
    #[error("storage lock poisoned")]
    LockPoisoned,

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Editor Errors ===
    /// Draft fields failed validation.
    #[error("invalid note: {message}")]
    Validation {
        /// What was wrong with the draft.
        message: String,
    },

    /// An action needs a selected note and none is selected.
    #[error("no note selected")]
    NoSelection,

    /// No note with the given id exists in the collection.
    #[error("note {id} not found")]
    NotFound {
        /// The id that was looked up.
        id: NoteId,
    },

    /// A list position outside the visible collection.
    #[error("no note at position {position} (have {count})")]
    NoSuchPosition {
        /// 1-based position that was asked for.
        position: usize,
        /// Number of visible notes.
        count: usize,
    },

    /// A write is already outstanding.
    #[error("another {operation} is still in progress")]
    OperationInFlight {
        /// Name of the outstanding operation.
        operation: &'static str,
    },

    // === Remote Errors ===
    /// The server answered with a non-success status.
    #[error("server responded with {status} {reason}")]
    ServerStatus {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase, or the response body if it had none.
        reason: String,
    },

    /// The request went out but no response came back.
    #[error("no response from {url}: {message}")]
    ServerUnreachable {
        /// Endpoint that was called.
        url: String,
        /// Transport error text.
        message: String,
    },

    /// The request could not be built or sent, or its response body was unusable.
    #[error("request failed: {message}")]
    RequestFailed {
        /// Underlying error text.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for notekeeper operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a not-found error for the given id.
    #[must_use]
    pub fn not_found(id: &NoteId) -> Self {
        Self::NotFound { id: id.clone() }
    }

    /// Classify a transport error from the HTTP client.
    ///
    /// Errors raised while building the request or decoding the response are
    /// request failures; everything else means the server never answered.
    #[must_use]
    pub fn from_transport(url: &str, err: &reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::ServerStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            };
        }
        if err.is_builder() || err.is_decode() || err.is_body() {
            return Self::RequestFailed {
                message: err.to_string(),
            };
        }
        Self::ServerUnreachable {
            url: url.to_string(),
            message: err.to_string(),
        }
    }

    /// Check if this error is a draft validation failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// The alert text shown to the user when an action fails with this error.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { .. } => "Please enter both a title and content!".to_string(),
            Self::ServerStatus { status, reason } => {
                format!("Server error: {status} {reason}").trim_end().to_string()
            }
            Self::ServerUnreachable { url, .. } => format!(
                "Cannot connect to the server. Make sure the notes server is running at {url}"
            ),
            Self::RequestFailed { message } => format!("Error: {message}"),
            Self::QuotaExceeded { .. }
            | Self::DatabaseQuery(_)
            | Self::LockPoisoned
            | Self::Json(_) => "Something went wrong while saving the note!".to_string(),
            Self::NoSelection => "Select a note first.".to_string(),
            Self::NotFound { id } => format!("Note {id} does not exist."),
            Self::NoSuchPosition { position, .. } => format!("There is no note number {position}."),
            Self::OperationInFlight { operation } => {
                format!("Please wait, a {operation} is still in progress.")
            }
            other => other.to_string(),
        }
    }
}
