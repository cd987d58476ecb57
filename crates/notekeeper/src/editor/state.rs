//! Immutable editor snapshots and the transitions between them.
//!
//! Every transition consumes a snapshot and returns the next one. Nothing in
//! this module performs I/O; [`super::NoteEditor`] runs the backend calls
//! between `begin_*` and the matching completion transition.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::note::{Draft, Note, NoteFields, NoteId};

/// What the editor pane is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Nothing selected, empty draft, delete unavailable.
    Browsing,
    /// A note is selected; saving replaces it in place.
    Editing,
    /// A new note is being written; saving creates it.
    Composing,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Browsing => write!(f, "browsing"),
            Self::Editing => write!(f, "editing"),
            Self::Composing => write!(f, "composing"),
        }
    }
}

/// Outcome of the most recent collection load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadStatus {
    /// No load has completed yet.
    #[default]
    Loading,
    /// The collection reflects the backend.
    Ready,
    /// The load failed and the collection was treated as empty.
    Degraded {
        /// Why the load failed.
        reason: String,
    },
}

impl LoadStatus {
    /// Whether the last load failed.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

/// A write that is waiting on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Create or update.
    Save,
    /// Delete.
    Delete,
}

impl Operation {
    /// Lower-case name for messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Save => "save",
            Self::Delete => "delete",
        }
    }
}

/// The backend call a save turns into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveRequest {
    /// Nothing was selected: create a note from these fields.
    Create(NoteFields),
    /// A note was selected: replace it with this revision.
    Update(Note),
}

/// A snapshot of the editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorState {
    notes: Vec<Note>,
    load: LoadStatus,
    selected: Option<Note>,
    draft: Draft,
    composing: bool,
    in_flight: Option<Operation>,
}

impl EditorState {
    /// A fresh editor that has not loaded anything yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The visible collection, possibly stale.
    #[must_use]
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Outcome of the most recent load.
    #[must_use]
    pub fn load_status(&self) -> &LoadStatus {
        &self.load
    }

    /// The selected note, as it was when selected or last refreshed.
    #[must_use]
    pub fn selected(&self) -> Option<&Note> {
        self.selected.as_ref()
    }

    /// Current draft fields.
    #[must_use]
    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// The write currently outstanding, if any.
    #[must_use]
    pub fn in_flight(&self) -> Option<Operation> {
        self.in_flight
    }

    /// Current mode, derived from selection and the composing flag.
    #[must_use]
    pub fn mode(&self) -> Mode {
        if self.selected.is_some() {
            Mode::Editing
        } else if self.composing {
            Mode::Composing
        } else {
            Mode::Browsing
        }
    }

    /// Whether the delete action is available.
    #[must_use]
    pub fn can_delete(&self) -> bool {
        self.selected.is_some()
    }

    /// Apply the result of a load.
    ///
    /// A failed load is not an error for the editor: the collection becomes
    /// empty and the status records why. A selection whose note is still
    /// present is refreshed from the new collection; one whose note is gone
    /// is dropped along with the draft.
    #[must_use]
    pub fn loaded(mut self, result: Result<Vec<Note>>) -> Self {
        match result {
            Ok(notes) => {
                self.notes = notes;
                self.load = LoadStatus::Ready;
            }
            Err(e) => {
                self.notes = Vec::new();
                self.load = LoadStatus::Degraded {
                    reason: e.to_string(),
                };
            }
        }

        if let Some(selected) = self.selected.take() {
            match self.find(&selected.id) {
                Some(fresh) => self.selected = Some(fresh.clone()),
                None => self.draft = Draft::default(),
            }
        }
        self
    }

    fn find(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| &n.id == id)
    }

    /// Select a note for editing, copying its fields into the draft.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no visible note has `id`.
    pub fn select(mut self, id: &NoteId) -> Result<Self> {
        let note = self.find(id).cloned().ok_or_else(|| Error::not_found(id))?;
        self.draft = Draft::from(&note);
        self.selected = Some(note);
        self.composing = false;
        Ok(self)
    }

    /// Start a new note: clear the draft and the selection.
    #[must_use]
    pub fn new_note(mut self) -> Self {
        self.selected = None;
        self.draft = Draft::default();
        self.composing = true;
        self
    }

    /// Leave the selected note without saving. Only meaningful while editing.
    #[must_use]
    pub fn cancel(self) -> Self {
        if self.selected.is_some() {
            self.new_note()
        } else {
            self
        }
    }

    /// Replace the draft title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.draft.title = title.into();
        self
    }

    /// Replace the draft content.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.draft.content = content.into();
        self
    }

    /// Add a line to the draft content.
    #[must_use]
    pub fn with_appended_line(mut self, line: &str) -> Self {
        if !self.draft.content.is_empty() {
            self.draft.content.push('\n');
        }
        self.draft.content.push_str(line);
        self
    }

    /// Fail if a write is outstanding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationInFlight`] naming the outstanding write.
    pub fn ensure_idle(&self) -> Result<()> {
        match self.in_flight {
            Some(op) => Err(Error::OperationInFlight {
                operation: op.name(),
            }),
            None => Ok(()),
        }
    }

    /// Validate the draft and claim the in-flight slot for a save.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationInFlight`] if a write is outstanding, or
    /// [`Error::Validation`] if the title or content is blank.
    pub fn begin_save(mut self, now: DateTime<Utc>) -> Result<(Self, SaveRequest)> {
        self.ensure_idle()?;
        let valid = self.draft.validate()?;
        let request = match &self.selected {
            Some(note) => SaveRequest::Update(note.revised(valid, now)),
            None => SaveRequest::Create(NoteFields::new_at(valid, now)),
        };
        self.in_flight = Some(Operation::Save);
        Ok((self, request))
    }

    /// Finish a successful save with the refreshed collection.
    ///
    /// After a create the editor starts another new note; after an update it
    /// stays on the edited note, re-selected from the refreshed collection.
    #[must_use]
    pub fn save_succeeded(mut self, request: &SaveRequest, refreshed: Result<Vec<Note>>) -> Self {
        self.in_flight = None;
        match request {
            SaveRequest::Create(_) => self.loaded(refreshed).new_note(),
            SaveRequest::Update(note) => {
                let next = self.loaded(refreshed);
                let id = note.id.clone();
                match next.clone().select(&id) {
                    Ok(selected) => selected,
                    Err(_) => next,
                }
            }
        }
    }

    /// Claim the in-flight slot for deleting the selected note.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSelection`] if nothing is selected, or
    /// [`Error::OperationInFlight`] if a write is outstanding.
    pub fn begin_delete(mut self) -> Result<(Self, NoteId)> {
        let id = self
            .selected
            .as_ref()
            .map(|n| n.id.clone())
            .ok_or(Error::NoSelection)?;
        self.ensure_idle()?;
        self.in_flight = Some(Operation::Delete);
        Ok((self, id))
    }

    /// Finish a successful delete: refresh and return to browsing.
    #[must_use]
    pub fn delete_succeeded(mut self, refreshed: Result<Vec<Note>>) -> Self {
        self.in_flight = None;
        self.selected = None;
        self.draft = Draft::default();
        self.composing = false;
        self.loaded(refreshed)
    }

    /// Release the in-flight slot after a failed write, keeping everything else.
    #[must_use]
    pub fn write_failed(mut self) -> Self {
        self.in_flight = None;
        self
    }
}
