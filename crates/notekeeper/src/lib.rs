//! `notekeeper` - keep short notes locally or in a REST collection
//!
//! A note has a title, content and creation/update timestamps. The
//! collection lives in exactly one backend: a local key-value database
//! ([`LocalBackend`]) or a remote resource collection ([`RemoteBackend`]).
//! [`NoteEditor`] implements create, edit and delete on top of either, and
//! [`Viewer`] is a read-only listing.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod backend;
pub mod cli;
pub mod config;
pub mod editor;
pub mod error;
pub mod logging;
pub mod note;
pub mod prompt;
pub mod render;
pub mod shell;
pub mod storage;
pub mod viewer;

pub use backend::{LocalBackend, NoteBackend, Refresh, RemoteBackend};
pub use config::Config;
pub use editor::{DeleteOutcome, EditorState, Mode, NoteEditor, SaveOutcome};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use note::{Draft, Note, NoteFields, NoteId};
pub use prompt::{AutoAnswer, Prompt, TerminalPrompt};
pub use render::Renderer;
pub use shell::Shell;
pub use storage::{KvStats, KvStore};
pub use viewer::Viewer;
