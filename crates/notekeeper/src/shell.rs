//! Interactive editing session over a line-oriented terminal.

use std::io::Write;

use tokio::io::AsyncBufRead;
use tracing::debug;

use crate::backend::NoteBackend;
use crate::editor::{DeleteOutcome, NoteEditor, SaveOutcome};
use crate::error::{Error, Result};
use crate::prompt::{Prompt, TerminalPrompt};
use crate::render::Renderer;

const HELP: &str = "\
Commands:
  list              show all notes
  open N            edit note number N
  new               start a new note
  title TEXT        set the title
  content TEXT      set the content
  append TEXT       add a line to the content
  show              show the note being edited
  save              save the note
  delete            delete the note being edited
  cancel            stop editing without saving
  reload            fetch the notes again
  help              show this help
  quit              leave";

/// One line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Show the list.
    List,
    /// Select by 1-based position.
    Open(usize),
    /// Start a new note.
    New,
    /// Set the draft title.
    Title(String),
    /// Set the draft content.
    Content(String),
    /// Append a content line.
    Append(String),
    /// Show the editor pane.
    Show,
    /// Save the draft.
    Save,
    /// Delete the selected note.
    Delete,
    /// Leave the selected note.
    Cancel,
    /// Re-fetch the collection.
    Reload,
    /// Show the command list.
    Help,
    /// End the session.
    Quit,
}

impl ShellCommand {
    /// Parse a line. Blank lines yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns a message describing what was wrong with the line.
    pub fn parse(line: &str) -> std::result::Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "list" | "ls" => Self::List,
            "open" | "o" => {
                let n: usize = rest
                    .parse()
                    .map_err(|_| format!("open needs a note number, got '{rest}'"))?;
                if n == 0 {
                    return Err("note numbers start at 1".to_string());
                }
                Self::Open(n)
            }
            "new" => Self::New,
            "title" => Self::Title(rest.to_string()),
            "content" => Self::Content(rest.to_string()),
            "append" => Self::Append(rest.to_string()),
            "show" => Self::Show,
            "save" => Self::Save,
            "delete" | "rm" => Self::Delete,
            "cancel" => Self::Cancel,
            "reload" => Self::Reload,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(format!("unknown command '{other}', try 'help'")),
        };
        Ok(Some(command))
    }
}

/// An editing session reading commands from `R` and writing to `W`.
#[derive(Debug)]
pub struct Shell<B, R, W> {
    editor: NoteEditor<B>,
    terminal: TerminalPrompt<R, W>,
    renderer: Renderer,
}

impl<B, R, W> Shell<B, R, W>
where
    B: NoteBackend,
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    /// Create a session around an already opened editor.
    pub fn new(editor: NoteEditor<B>, terminal: TerminalPrompt<R, W>, renderer: Renderer) -> Self {
        Self {
            editor,
            terminal,
            renderer,
        }
    }

    /// The editor driven by this session.
    pub fn editor(&self) -> &NoteEditor<B> {
        &self.editor
    }

    /// Run until `quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error only if reading input fails. Command failures are
    /// shown as alerts and the session continues.
    pub async fn run(&mut self) -> Result<()> {
        let location = self.editor.backend().location();
        self.terminal.println(&format!(
            "notekeeper ({} backend: {location}). Type 'help' for commands.",
            self.editor.backend().name()
        ));
        self.show_list();

        loop {
            self.terminal.print_flush("> ");
            let Some(line) = self.terminal.read_line().await? else {
                break;
            };
            match ShellCommand::parse(&line) {
                Ok(None) => {}
                Ok(Some(ShellCommand::Quit)) => break,
                Ok(Some(command)) => self.dispatch(command).await,
                Err(message) => self.terminal.println(&message),
            }
        }
        debug!("Shell session ended");
        Ok(())
    }

    /// Execute one command.
    pub async fn dispatch(&mut self, command: ShellCommand) {
        match command {
            ShellCommand::List => self.show_list(),
            ShellCommand::Open(n) => {
                let selected = match n.checked_sub(1) {
                    Some(index) => self.editor.select_index(index),
                    None => Err(Error::NoSuchPosition {
                        position: n,
                        count: self.editor.state().notes().len(),
                    }),
                };
                match selected {
                    Ok(()) => self.show_editor(),
                    Err(e) => self.terminal.alert(&e.user_message()).await,
                }
            }
            ShellCommand::New => {
                self.editor.new_note();
                self.show_editor();
            }
            ShellCommand::Title(text) => self.editor.set_title(text),
            ShellCommand::Content(text) => self.editor.set_content(text),
            ShellCommand::Append(text) => self.editor.append_line(&text),
            ShellCommand::Show => self.show_editor(),
            ShellCommand::Save => match self.editor.save().await {
                Ok(SaveOutcome::Created) => {
                    self.terminal.println("Note created.");
                    self.show_list();
                }
                Ok(SaveOutcome::Updated(_)) => {
                    self.terminal.println("Note updated.");
                    self.show_list();
                }
                Err(e) => self.terminal.alert(&e.user_message()).await,
            },
            ShellCommand::Delete => {
                let outcome = self.editor.delete(&mut self.terminal).await;
                match outcome {
                    Ok(DeleteOutcome::Deleted(_)) => {
                        self.terminal.println("Note deleted.");
                        self.show_list();
                    }
                    Ok(DeleteOutcome::Cancelled) => {}
                    Err(e) => self.terminal.alert(&e.user_message()).await,
                }
            }
            ShellCommand::Cancel => {
                self.editor.cancel();
                self.show_editor();
            }
            ShellCommand::Reload => {
                self.editor.reload().await;
                self.show_list();
            }
            ShellCommand::Help => self.terminal.println(HELP),
            ShellCommand::Quit => {}
        }
    }

    fn show_list(&mut self) {
        let state = self.editor.state();
        let text = self.renderer.list(
            state.notes(),
            state.selected().map(|n| &n.id),
            state.load_status(),
        );
        self.terminal.print_flush(&text);
    }

    fn show_editor(&mut self) {
        let text = self.renderer.editor(self.editor.state());
        self.terminal.print_flush(&text);
    }

    /// Consume the session, returning the terminal writer.
    pub fn into_output(self) -> W {
        self.terminal.into_output()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LocalBackend;
    use crate::config::DisplayConfig;
    use crate::storage::KvStore;
    use chrono::FixedOffset;

    async fn run_script(script: &str) -> (String, Vec<crate::note::Note>) {
        let backend = LocalBackend::new(
            KvStore::open_in_memory(64 * 1024).unwrap(),
            "notes-app-data".to_string(),
        );
        let editor = NoteEditor::open(backend).await;
        let renderer =
            Renderer::new(&DisplayConfig::default()).with_offset(FixedOffset::east_opt(0).unwrap());
        let mut shell = Shell::new(
            editor,
            TerminalPrompt::new(script.as_bytes(), Vec::new()),
            renderer,
        );
        shell.run().await.unwrap();
        let stored = shell.editor().backend().load().unwrap();
        (String::from_utf8(shell.into_output()).unwrap(), stored)
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(ShellCommand::parse("  "), Ok(None));
        assert_eq!(ShellCommand::parse("open 3"), Ok(Some(ShellCommand::Open(3))));
        assert_eq!(
            ShellCommand::parse("title  Buy milk "),
            Ok(Some(ShellCommand::Title("Buy milk".to_string())))
        );
        assert_eq!(ShellCommand::parse("EXIT"), Ok(Some(ShellCommand::Quit)));
        assert_eq!(ShellCommand::parse("title"), Ok(Some(ShellCommand::Title(String::new()))));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(ShellCommand::parse("open x").is_err());
        assert!(ShellCommand::parse("open 0").is_err());
        assert!(ShellCommand::parse("frobnicate").unwrap_err().contains("frobnicate"));
    }

    #[tokio::test]
    async fn test_session_starts_with_empty_state() {
        let (out, _) = run_script("quit\n").await;
        assert!(out.contains("No notes yet"));
        assert!(out.contains("Create a new note to get started!"));
    }

    #[tokio::test]
    async fn test_create_edit_delete_session() {
        let script = "\
new
title Shopping
content milk
append eggs
save
open 1
title Groceries
save
delete
y
";
        let (out, stored) = run_script(script).await;

        assert!(out.contains("Note created."));
        assert!(out.contains("Note updated."));
        assert!(out.contains("Are you sure you want to delete this note?"));
        assert!(out.contains("Note deleted."));
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn test_declined_delete_keeps_note() {
        let script = "new\ntitle A\ncontent B\nsave\nopen 1\ndelete\nn\n";
        let (out, stored) = run_script(script).await;

        assert!(!out.contains("Note deleted."));
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].title, "A");
    }

    #[tokio::test]
    async fn test_blank_save_alerts() {
        let (out, stored) = run_script("new\ntitle only\nsave\n").await;
        assert!(out.contains("! Please enter both a title and content!"));
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn test_delete_without_selection_alerts() {
        let (out, _) = run_script("delete\n").await;
        assert!(out.contains("! Select a note first."));
    }

    #[tokio::test]
    async fn test_open_zero_alerts_instead_of_panicking() {
        let backend = LocalBackend::new(
            KvStore::open_in_memory(64 * 1024).unwrap(),
            "notes-app-data".to_string(),
        );
        let editor = NoteEditor::open(backend).await;
        let mut shell = Shell::new(
            editor,
            TerminalPrompt::new(&b""[..], Vec::new()),
            Renderer::new(&DisplayConfig::default()),
        );

        shell.dispatch(ShellCommand::Open(0)).await;

        assert!(shell.editor().state().selected().is_none());
        let out = String::from_utf8(shell.into_output()).unwrap();
        assert!(out.contains("! There is no note number 0."));
    }

    #[tokio::test]
    async fn test_multiline_content_is_kept() {
        let (_, stored) = run_script("new\ntitle T\nappend one\nappend two\nsave\n").await;
        assert_eq!(stored[0].content, "one\ntwo");
    }
}
