//! Persistence backends for the note collection.
//!
//! Two interchangeable implementations exist: [`LocalBackend`] keeps the
//! collection as one JSON value in the local key-value store, and
//! [`RemoteBackend`] talks to a REST resource collection. Exactly one is
//! active per process.

mod local;
mod remote;

pub use local::LocalBackend;
pub use remote::RemoteBackend;

use crate::config::{BackendKind, Config};
use crate::error::Result;
use crate::note::{Note, NoteFields, NoteId};
use crate::storage::KvStore;

/// What the caller should do with its collection after a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refresh {
    /// The backend already knows the new collection.
    Updated(Vec<Note>),
    /// The collection must be fetched again with [`NoteBackend::list`].
    Refetch,
}

/// A store that owns the durable copy of the note collection.
///
/// Write operations receive the caller's current collection. Backends that
/// persist the whole collection at once (the local store) build the new
/// collection from it; backends with server-side identity ignore it and ask
/// for a re-fetch.
#[async_trait::async_trait]
pub trait NoteBackend: Send + Sync {
    /// Short backend name for logs and status output.
    fn name(&self) -> &'static str;

    /// Where the collection lives (a database path or a URL).
    fn location(&self) -> String;

    /// Fetch the whole collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read or decoded.
    async fn list(&self) -> Result<Vec<Note>>;

    /// Persist a new note; the backend assigns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails; nothing is changed in that case.
    async fn create(&self, notes: &[Note], fields: NoteFields) -> Result<Refresh>;

    /// Replace the stored note that has `note.id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the note does not exist or the write fails.
    async fn update(&self, notes: &[Note], note: &Note) -> Result<Refresh>;

    /// Delete the note with `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the note does not exist or the write fails.
    async fn delete(&self, notes: &[Note], id: &NoteId) -> Result<Refresh>;
}

#[async_trait::async_trait]
impl<T: NoteBackend + ?Sized> NoteBackend for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn location(&self) -> String {
        (**self).location()
    }

    async fn list(&self) -> Result<Vec<Note>> {
        (**self).list().await
    }

    async fn create(&self, notes: &[Note], fields: NoteFields) -> Result<Refresh> {
        (**self).create(notes, fields).await
    }

    async fn update(&self, notes: &[Note], note: &Note) -> Result<Refresh> {
        (**self).update(notes, note).await
    }

    async fn delete(&self, notes: &[Note], id: &NoteId) -> Result<Refresh> {
        (**self).delete(notes, id).await
    }
}

/// Build the backend selected by `kind` from configuration.
///
/// # Errors
///
/// Returns an error if the local database cannot be opened.
pub fn from_config(config: &Config, kind: BackendKind) -> Result<Box<dyn NoteBackend>> {
    Ok(match kind {
        BackendKind::Local => {
            let store = KvStore::open(config.database_path(), config.local.max_value_bytes)?;
            Box::new(LocalBackend::new(store, config.local.storage_key.clone()))
        }
        BackendKind::Remote => Box::new(RemoteBackend::new(
            config.remote.base_url.clone(),
            config.refetch_delay(),
        )),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_remote() {
        let config = Config::default();
        let backend = from_config(&config, BackendKind::Remote).unwrap();
        assert_eq!(backend.name(), "remote");
        assert_eq!(backend.location(), "http://localhost:3001/notes");
    }

    #[test]
    fn test_from_config_local() {
        let mut config = Config::default();
        let db_path = std::env::temp_dir().join(format!(
            "notekeeper_backend_test_{}.db",
            std::process::id()
        ));
        config.local.database_path = Some(db_path.clone());

        let backend = from_config(&config, BackendKind::Local).unwrap();
        assert_eq!(backend.name(), "local");
        assert!(backend.location().contains("notekeeper_backend_test"));

        drop(backend);
        let _ = std::fs::remove_file(&db_path);
        let _ = std::fs::remove_file(db_path.with_extension("db-wal"));
        let _ = std::fs::remove_file(db_path.with_extension("db-shm"));
    }

    #[tokio::test]
    async fn test_boxed_backend_delegates() {
        let store = KvStore::open_in_memory(4096).unwrap();
        let backend: Box<dyn NoteBackend> = Box::new(LocalBackend::new(store, "k".to_string()));
        assert!(backend.list().await.unwrap().is_empty());
    }
}
