//! User-facing confirmations and alerts.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Question asked before a note is deleted.
pub const DELETE_QUESTION: &str = "Are you sure you want to delete this note?";

/// Asks the user to confirm destructive actions and shows blocking alerts.
#[async_trait::async_trait]
pub trait Prompt: Send {
    /// Ask a yes/no question. Anything other than an explicit yes is a no.
    async fn confirm(&mut self, question: &str) -> bool;

    /// Show a message the user has to see.
    async fn alert(&mut self, message: &str);
}

/// Answers every confirmation the same way and logs alerts.
///
/// Used for non-interactive runs such as `delete --yes`.
#[derive(Debug, Clone, Copy)]
pub struct AutoAnswer(pub bool);

#[async_trait::async_trait]
impl Prompt for AutoAnswer {
    async fn confirm(&mut self, question: &str) -> bool {
        tracing::debug!("Auto-answering '{}' with {}", question, self.0);
        self.0
    }

    async fn alert(&mut self, message: &str) {
        tracing::warn!("{}", message);
    }
}

/// Line-oriented prompt over any async reader and writer.
#[derive(Debug)]
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

impl<R, W> TerminalPrompt<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    /// Create a prompt reading from `input` and writing to `output`.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Read one line without its terminator. `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails.
    pub async fn read_line(&mut self) -> std::io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    /// Write `text` followed by a newline.
    pub fn println(&mut self, text: &str) {
        if let Err(e) = writeln!(self.output, "{text}") {
            tracing::warn!("Failed to write to terminal: {}", e);
        }
    }

    /// Write `text` without a newline and flush.
    pub fn print_flush(&mut self, text: &str) {
        if let Err(e) = write!(self.output, "{text}").and_then(|()| self.output.flush()) {
            tracing::warn!("Failed to write to terminal: {}", e);
        }
    }

    /// Consume the prompt, returning the writer.
    pub fn into_output(self) -> W {
        self.output
    }
}

#[async_trait::async_trait]
impl<R, W> Prompt for TerminalPrompt<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    async fn confirm(&mut self, question: &str) -> bool {
        self.print_flush(&format!("{question} [y/N] "));
        match self.read_line().await {
            Ok(Some(answer)) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Ok(None) => false,
            Err(e) => {
                tracing::warn!("Failed to read confirmation: {}", e);
                false
            }
        }
    }

    async fn alert(&mut self, message: &str) {
        self.println(&format!("! {message}"));
    }
}
