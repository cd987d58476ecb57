//! The note editor: one collection, one selection, one draft.
//!
//! [`EditorState`] holds the snapshot and its pure transitions.
//! [`NoteEditor`] drives a [`NoteBackend`] around those transitions, so a
//! failed write never touches the collection, selection or draft.

mod state;

pub use state::{EditorState, LoadStatus, Mode, Operation, SaveRequest};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::backend::{NoteBackend, Refresh};
use crate::error::{Error, Result};
use crate::note::{Note, NoteId};
use crate::prompt::{Prompt, DELETE_QUESTION};

/// Result of a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A new note was created.
    Created,
    /// The note with this id was updated.
    Updated(NoteId),
}

/// Result of a delete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The note was removed.
    Deleted(NoteId),
    /// The user declined the confirmation; nothing changed.
    Cancelled,
}

/// Drives a backend on behalf of the editor state.
#[derive(Debug)]
pub struct NoteEditor<B> {
    backend: B,
    state: EditorState,
}

impl<B: NoteBackend> NoteEditor<B> {
    /// Create an editor that has not loaded anything yet.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: EditorState::new(),
        }
    }

    /// Create an editor and load the collection.
    pub async fn open(backend: B) -> Self {
        let mut editor = Self::new(backend);
        editor.reload().await;
        editor
    }

    /// Current snapshot.
    #[must_use]
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// The backend in use.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Re-fetch the collection.
    ///
    /// A failed fetch is logged and leaves an empty, degraded collection.
    pub async fn reload(&mut self) {
        let result = self.fetch().await;
        self.state = std::mem::take(&mut self.state).loaded(result);
    }

    async fn fetch(&self) -> Result<Vec<Note>> {
        let result = self.backend.list().await;
        match &result {
            Ok(notes) => debug!("Loaded {} notes from {}", notes.len(), self.backend.name()),
            Err(e) => warn!(
                "Could not load notes from {}, showing none: {}",
                self.backend.location(),
                e
            ),
        }
        result
    }

    async fn refreshed(&self, refresh: Refresh) -> Result<Vec<Note>> {
        match refresh {
            Refresh::Updated(notes) => Ok(notes),
            Refresh::Refetch => self.fetch().await,
        }
    }

    /// Select the note with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no visible note has `id`.
    pub fn select(&mut self, id: &NoteId) -> Result<()> {
        self.state = self.state.clone().select(id)?;
        Ok(())
    }

    /// Select the `index`th visible note, counting from zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSuchPosition`] if the index is out of range.
    pub fn select_index(&mut self, index: usize) -> Result<()> {
        let notes = self.state.notes();
        let id = notes
            .get(index)
            .map(|n| n.id.clone())
            .ok_or(Error::NoSuchPosition {
                position: index.saturating_add(1),
                count: notes.len(),
            })?;
        self.select(&id)
    }

    /// Start a new note.
    pub fn new_note(&mut self) {
        self.state = std::mem::take(&mut self.state).new_note();
    }

    /// Leave the selected note without saving.
    pub fn cancel(&mut self) {
        self.state = std::mem::take(&mut self.state).cancel();
    }

    /// Replace the draft title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.state = std::mem::take(&mut self.state).with_title(title);
    }

    /// Replace the draft content.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.state = std::mem::take(&mut self.state).with_content(content);
    }

    /// Add a line to the draft content.
    pub fn append_line(&mut self, line: &str) {
        self.state = std::mem::take(&mut self.state).with_appended_line(line);
    }

    /// Save the draft: update the selected note, or create a new one.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank draft,
    /// [`Error::OperationInFlight`] while another write is outstanding, or
    /// the backend's error. On any error the collection, selection and draft
    /// are unchanged.
    pub async fn save(&mut self) -> Result<SaveOutcome> {
        let (pending, request) = self
            .state
            .clone()
            .begin_save(Utc::now())
            .inspect_err(|e| {
                if e.is_validation() {
                    debug!("Save rejected: {}", e);
                }
            })?;
        self.state = pending;

        let written = match &request {
            SaveRequest::Create(fields) => {
                self.backend
                    .create(self.state.notes(), fields.clone())
                    .await
            }
            SaveRequest::Update(note) => self.backend.update(self.state.notes(), note).await,
        };

        let refresh = match written {
            Ok(refresh) => refresh,
            Err(e) => {
                self.state = std::mem::take(&mut self.state).write_failed();
                return Err(e);
            }
        };

        let refreshed = self.refreshed(refresh).await;
        self.state = std::mem::take(&mut self.state).save_succeeded(&request, refreshed);

        Ok(match request {
            SaveRequest::Create(_) => {
                info!("Created note via {}", self.backend.name());
                SaveOutcome::Created
            }
            SaveRequest::Update(note) => {
                info!("Updated note {} via {}", note.id, self.backend.name());
                SaveOutcome::Updated(note.id)
            }
        })
    }

    /// Delete the selected note after asking `prompt` for confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSelection`] when nothing is selected,
    /// [`Error::OperationInFlight`] while another write is outstanding, or
    /// the backend's error. A declined confirmation is not an error.
    pub async fn delete(&mut self, prompt: &mut dyn Prompt) -> Result<DeleteOutcome> {
        if self.state.selected().is_none() {
            return Err(Error::NoSelection);
        }
        self.state.ensure_idle()?;

        if !prompt.confirm(DELETE_QUESTION).await {
            debug!("Delete declined");
            return Ok(DeleteOutcome::Cancelled);
        }

        let (pending, id) = self.state.clone().begin_delete()?;
        self.state = pending;

        let refresh = match self.backend.delete(self.state.notes(), &id).await {
            Ok(refresh) => refresh,
            Err(e) => {
                self.state = std::mem::take(&mut self.state).write_failed();
                return Err(e);
            }
        };

        let refreshed = self.refreshed(refresh).await;
        self.state = std::mem::take(&mut self.state).delete_succeeded(refreshed);
        info!("Deleted note {} via {}", id, self.backend.name());
        Ok(DeleteOutcome::Deleted(id))
    }
}
