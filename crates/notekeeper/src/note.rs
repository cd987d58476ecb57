//! Core note types for notekeeper.
//!
//! This module defines the note record shared by every backend, the id-less
//! payload used for writes, and the draft fields edited before a save.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identifier of a note.
///
/// The local backend generates millisecond timestamps; remote servers may hand
/// out numbers or strings, so both are accepted on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NoteId {
    /// Numeric identifier.
    Number(i64),
    /// Textual identifier.
    Text(String),
}

impl NoteId {
    /// The numeric value of this id, if it has one.
    #[must_use]
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.parse().ok(),
        }
    }
}

impl std::fmt::Display for NoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for NoteId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl std::str::FromStr for NoteId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(s.parse::<i64>()
            .map_or_else(|_| Self::Text(s.to_string()), Self::Number))
    }
}

/// A stored note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier within the collection.
    pub id: NoteId,
    /// Note title, never empty after trimming.
    pub title: String,
    /// Note body, never empty after trimming.
    pub content: String,
    /// Set once, on the first save.
    pub created_at: DateTime<Utc>,
    /// Refreshed on every save.
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Attach an identifier to a write payload.
    #[must_use]
    pub fn from_fields(id: NoteId, fields: NoteFields) -> Self {
        Self {
            id,
            title: fields.title,
            content: fields.content,
            created_at: fields.created_at,
            updated_at: fields.updated_at,
        }
    }

    /// The write payload for this note, without its id.
    #[must_use]
    pub fn fields(&self) -> NoteFields {
        NoteFields {
            title: self.title.clone(),
            content: self.content.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Apply a validated draft to this note.
    ///
    /// Keeps `id` and `created_at`; `updated_at` becomes `now`, but never
    /// moves backwards if the clock went back since the last save.
    #[must_use]
    pub fn revised(&self, draft: ValidDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: self.id.clone(),
            title: draft.title,
            content: draft.content,
            created_at: self.created_at,
            updated_at: now.max(self.updated_at),
        }
    }
}

/// Body of a create or update request: a note without its `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteFields {
    /// Note title.
    pub title: String,
    /// Note body.
    pub content: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl NoteFields {
    /// Build the payload for a brand new note, stamped with `now`.
    #[must_use]
    pub fn new_at(draft: ValidDraft, now: DateTime<Utc>) -> Self {
        Self {
            title: draft.title,
            content: draft.content,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Editable title and content, not yet part of any note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    /// Title as typed.
    pub title: String,
    /// Content as typed.
    pub content: String,
}

/// A draft whose fields are trimmed and known to be non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDraft {
    title: String,
    content: String,
}

impl ValidDraft {
    /// Trimmed title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Trimmed content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

impl Draft {
    /// Create a draft from raw field values.
    #[must_use]
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Check that both fields are present and return their trimmed values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the title or content is empty or only
    /// whitespace.
    pub fn validate(&self) -> Result<ValidDraft> {
        let title = self.title.trim();
        let content = self.content.trim();
        if title.is_empty() || content.is_empty() {
            return Err(Error::validation("title and content are both required"));
        }
        Ok(ValidDraft {
            title: title.to_string(),
            content: content.to_string(),
        })
    }
}

impl From<&Note> for Draft {
    fn from(note: &Note) -> Self {
        Self::new(note.title.clone(), note.content.clone())
    }
}
