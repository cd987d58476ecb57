//! Plain-text rendering of notes, the note list and the editor pane.

use std::fmt::Write as _;

use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};

use crate::config::DisplayConfig;
use crate::editor::{EditorState, LoadStatus, Mode};
use crate::note::{Note, NoteId};

/// Heading shown when there is nothing to list.
pub const EMPTY_TITLE: &str = "No notes yet";

/// Hint shown under [`EMPTY_TITLE`].
pub const EMPTY_HINT: &str = "Create a new note to get started!";

/// First `max_chars` characters of `content`, with `...` appended when
/// anything was cut. Line breaks become spaces.
#[must_use]
pub fn preview(content: &str, max_chars: usize) -> String {
    let mut chars = content.chars();
    let mut out: String = chars
        .by_ref()
        .take(max_chars)
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    if chars.next().is_some() {
        out.push_str("...");
    }
    out
}

/// Format `at` in `zone` with a `strftime` format.
#[must_use]
pub fn format_date<Tz>(at: &DateTime<Utc>, zone: &Tz, format: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    at.with_timezone(zone).format(format).to_string()
}

/// Renders notes according to the display settings.
#[derive(Debug, Clone)]
pub struct Renderer {
    preview_chars: usize,
    date_format: String,
    offset: Option<FixedOffset>,
}

impl Renderer {
    /// Renderer using the local time zone.
    #[must_use]
    pub fn new(display: &DisplayConfig) -> Self {
        Self {
            preview_chars: display.preview_chars,
            date_format: display.date_format.clone(),
            offset: None,
        }
    }

    /// Render dates at a fixed UTC offset instead of local time.
    #[must_use]
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Short form of a note's content.
    #[must_use]
    pub fn preview(&self, content: &str) -> String {
        preview(content, self.preview_chars)
    }

    /// A timestamp as a calendar date.
    #[must_use]
    pub fn date(&self, at: &DateTime<Utc>) -> String {
        match &self.offset {
            Some(offset) => format_date(at, offset, &self.date_format),
            None => format_date(at, &Local, &self.date_format),
        }
    }

    /// The numbered note list, marking `selected`.
    #[must_use]
    pub fn list(&self, notes: &[Note], selected: Option<&NoteId>, load: &LoadStatus) -> String {
        let mut out = String::new();
        match load {
            LoadStatus::Loading => {
                out.push_str("Loading notes...\n");
                return out;
            }
            LoadStatus::Degraded { reason } => {
                let _ = writeln!(out, "! Could not load notes: {reason}");
            }
            LoadStatus::Ready => {}
        }

        if notes.is_empty() {
            let _ = writeln!(out, "{EMPTY_TITLE}");
            let _ = writeln!(out, "{EMPTY_HINT}");
            return out;
        }

        let _ = writeln!(out, "Notes ({})", notes.len());
        for (i, note) in notes.iter().enumerate() {
            let marker = if selected == Some(&note.id) { '>' } else { ' ' };
            let _ = writeln!(
                out,
                "{marker} {:>2}. {}  [{}]",
                i + 1,
                note.title,
                self.date(&note.created_at)
            );
            let _ = writeln!(out, "      {}", self.preview(&note.content));
        }
        out
    }

    /// The editor pane for the current state.
    #[must_use]
    pub fn editor(&self, state: &EditorState) -> String {
        let mut out = String::new();
        let heading = match state.mode() {
            Mode::Editing => "Edit note",
            Mode::Browsing | Mode::Composing => "New note",
        };
        let _ = writeln!(out, "-- {heading} --");
        let _ = writeln!(out, "Title:   {}", state.draft().title);
        let _ = writeln!(out, "Content:");
        for line in state.draft().content.lines() {
            let _ = writeln!(out, "  {line}");
        }
        let actions = if state.can_delete() {
            "save | delete | cancel"
        } else {
            "save"
        };
        let _ = writeln!(out, "[{actions}]");
        if let Some(op) = state.in_flight() {
            let _ = writeln!(out, "({} in progress)", op.name());
        }
        out
    }

    /// A note in full: title, content and creation date.
    #[must_use]
    pub fn note(&self, note: &Note) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", note.title);
        for line in note.content.lines() {
            let _ = writeln!(out, "  {line}");
        }
        let _ = writeln!(out, "  Created: {}", self.date(&note.created_at));
        out
    }
}
