//! Read-only view of the remote collection.

use tracing::error;

use crate::backend::NoteBackend;
use crate::note::Note;
use crate::render::Renderer;

/// Shown when there is nothing to display.
pub const NOTHING_TO_SHOW: &str = "No notes found";

/// Fetches and displays notes without offering any edits.
#[derive(Debug)]
pub struct Viewer<B> {
    backend: B,
}

impl<B: NoteBackend> Viewer<B> {
    /// Create a viewer over `backend`.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Fetch the collection once. A failed fetch is logged and yields nothing.
    pub async fn load(&self) -> Vec<Note> {
        match self.backend.list().await {
            Ok(notes) => notes,
            Err(e) => {
                error!("Failed to fetch notes from {}: {}", self.backend.location(), e);
                Vec::new()
            }
        }
    }

    /// Fetch and render every note in full.
    pub async fn render(&self, renderer: &Renderer) -> String {
        let notes = self.load().await;
        if notes.is_empty() {
            return format!("{NOTHING_TO_SHOW}\n");
        }
        notes
            .iter()
            .map(|n| renderer.note(n))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
