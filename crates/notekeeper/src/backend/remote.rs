//! Remote resource backend: a REST collection of notes.
//!
//! `GET <base>` lists, `POST <base>` creates, `PUT <base>/<id>` replaces and
//! `DELETE <base>/<id>` removes. Writes never merge optimistically; the
//! caller re-fetches the list afterwards.

use std::time::Duration;

use reqwest::{Client, Response};
use tracing::{debug, error, info};

use super::{NoteBackend, Refresh};
use crate::error::{Error, Result};
use crate::note::{Note, NoteFields, NoteId};

/// Talks to a notes resource collection over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    client: Client,
    base_url: String,
    refetch_delay: Option<Duration>,
}

impl RemoteBackend {
    /// Create a backend for the collection at `base_url`.
    ///
    /// `refetch_delay` is slept after a create or update before the caller is
    /// told to re-fetch, for servers that are only eventually consistent.
    #[must_use]
    pub fn new(base_url: impl Into<String>, refetch_delay: Option<Duration>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            refetch_delay,
        }
    }

    /// URL of the collection.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn item_url(&self, id: &NoteId) -> String {
        format!("{}/{}", self.base_url, id)
    }

    /// Classify the outcome of a request, turning non-2xx answers into
    /// [`Error::ServerStatus`].
    async fn check(&self, url: &str, sent: reqwest::Result<Response>) -> Result<Response> {
        let response = sent.map_err(|e| Error::from_transport(url, &e))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let reason = match status.canonical_reason() {
            Some(reason) => reason.to_string(),
            None => response.text().await.unwrap_or_default(),
        };
        Err(Error::ServerStatus {
            status: status.as_u16(),
            reason,
        })
    }

    async fn settle(&self) {
        if let Some(delay) = self.refetch_delay {
            debug!("Waiting {:?} before re-fetching", delay);
            tokio::time::sleep(delay).await;
        }
    }

    fn log_write_failure(operation: &str, err: &Error) {
        match err {
            Error::ServerStatus { status, reason } => {
                error!("{} failed: server responded {} {}", operation, status, reason);
            }
            Error::ServerUnreachable { url, message } => {
                error!("{} failed: no response from {}: {}", operation, url, message);
            }
            other => error!("{} failed: {}", operation, other),
        }
    }
}

#[async_trait::async_trait]
impl NoteBackend for RemoteBackend {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn location(&self) -> String {
        self.base_url.clone()
    }

    async fn list(&self) -> Result<Vec<Note>> {
        let url = self.base_url.as_str();
        let response = self.check(url, self.client.get(url).send().await).await?;
        let notes: Vec<Note> = response
            .json()
            .await
            .map_err(|e| Error::from_transport(url, &e))?;
        debug!("Fetched {} notes from {}", notes.len(), url);
        Ok(notes)
    }

    async fn create(&self, _notes: &[Note], fields: NoteFields) -> Result<Refresh> {
        let url = self.base_url.as_str();
        let sent = self.client.post(url).json(&fields).send().await;
        let response = self.check(url, sent).await.inspect_err(|e| {
            Self::log_write_failure("create", e);
        })?;

        match response.json::<Note>().await {
            Ok(created) => info!("Created note {} at {}", created.id, url),
            Err(e) => debug!("Create response had no usable note body: {}", e),
        }

        self.settle().await;
        Ok(Refresh::Refetch)
    }

    async fn update(&self, _notes: &[Note], note: &Note) -> Result<Refresh> {
        let url = self.item_url(&note.id);
        let sent = self.client.put(&url).json(&note.fields()).send().await;
        self.check(&url, sent).await.inspect_err(|e| {
            Self::log_write_failure("update", e);
        })?;
        info!("Updated note {}", note.id);

        self.settle().await;
        Ok(Refresh::Refetch)
    }

    async fn delete(&self, _notes: &[Note], id: &NoteId) -> Result<Refresh> {
        let url = self.item_url(id);
        let sent = self.client.delete(&url).send().await;
        self.check(&url, sent).await.inspect_err(|e| {
            Self::log_write_failure("delete", e);
        })?;
        info!("Deleted note {}", id);

        Ok(Refresh::Refetch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let backend = RemoteBackend::new("http://localhost:3001/notes/", None);
        assert_eq!(backend.base_url(), "http://localhost:3001/notes");
        assert_eq!(backend.location(), "http://localhost:3001/notes");
    }

    #[test]
    fn test_item_url() {
        let backend = RemoteBackend::new("http://localhost:3001/notes", None);
        assert_eq!(
            backend.item_url(&NoteId::Number(4)),
            "http://localhost:3001/notes/4"
        );
        assert_eq!(
            backend.item_url(&NoteId::Text("ab12".to_string())),
            "http://localhost:3001/notes/ab12"
        );
    }

    #[tokio::test]
    async fn test_invalid_url_is_request_failure() {
        let backend = RemoteBackend::new("notes without scheme", None);
        let err = backend.list().await.unwrap_err();
        assert!(matches!(err, Error::RequestFailed { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        // Bind then drop to get a port nobody listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let base = format!("http://{addr}/notes");
        let backend = RemoteBackend::new(base.clone(), None);
        let err = backend
            .delete(&[], &NoteId::Number(1))
            .await
            .unwrap_err();

        match err {
            Error::ServerUnreachable { url, .. } => assert_eq!(url, format!("{base}/1")),
            other => panic!("expected unreachable, got {other:?}"),
        }
    }
}
