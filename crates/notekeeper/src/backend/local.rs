//! Local store backend: the whole collection under one key.

use chrono::Utc;
use tracing::{debug, error};

use super::{NoteBackend, Refresh};
use crate::error::{Error, Result};
use crate::note::{Note, NoteFields, NoteId};
use crate::storage::KvStore;

/// Keeps the note collection as a JSON array under a single key.
#[derive(Debug)]
pub struct LocalBackend {
    store: KvStore,
    key: String,
}

impl LocalBackend {
    /// Create a backend over `store` using `key`.
    #[must_use]
    pub fn new(store: KvStore, key: String) -> Self {
        Self { store, key }
    }

    /// The underlying key-value store.
    #[must_use]
    pub fn store(&self) -> &KvStore {
        &self.store
    }

    /// Read the collection. A missing key is an empty collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or the stored value is
    /// not a JSON array of notes.
    pub fn load(&self) -> Result<Vec<Note>> {
        match self.store.get(&self.key)? {
            None => Ok(Vec::new()),
            Some(raw) => Ok(serde_json::from_str(&raw)?),
        }
    }

    /// Replace the stored collection with `notes`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails (for example when
    /// the value exceeds the store quota). The stored value is unchanged then.
    pub fn save(&self, notes: &[Note]) -> Result<()> {
        let raw = serde_json::to_string(notes)?;
        if let Err(e) = self.store.set(&self.key, &raw) {
            error!("Failed to save notes under '{}': {}", self.key, e);
            return Err(e);
        }
        debug!("Saved {} notes under '{}'", notes.len(), self.key);
        Ok(())
    }

    fn save_and_return(&self, notes: Vec<Note>) -> Result<Refresh> {
        self.save(&notes)?;
        Ok(Refresh::Updated(notes))
    }
}

/// Pick an id for a new note: the current time in milliseconds, bumped past
/// any existing numeric id so two creates in the same millisecond never clash.
fn next_local_id(notes: &[Note], now_ms: i64) -> Result<NoteId> {
    let highest = notes.iter().filter_map(|n| n.id.as_number()).max();
    match highest {
        Some(max) if max >= now_ms => max
            .checked_add(1)
            .map(NoteId::Number)
            .ok_or_else(|| Error::internal(format!("no note id left after {max}"))),
        _ => Ok(NoteId::Number(now_ms)),
    }
}

#[async_trait::async_trait]
impl NoteBackend for LocalBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    fn location(&self) -> String {
        format!("{} [{}]", self.store.path().display(), self.key)
    }

    async fn list(&self) -> Result<Vec<Note>> {
        self.load()
    }

    async fn create(&self, notes: &[Note], fields: NoteFields) -> Result<Refresh> {
        let id = next_local_id(notes, Utc::now().timestamp_millis())?;
        let mut updated = notes.to_vec();
        updated.push(Note::from_fields(id, fields));
        self.save_and_return(updated)
    }

    async fn update(&self, notes: &[Note], note: &Note) -> Result<Refresh> {
        if !notes.iter().any(|n| n.id == note.id) {
            return Err(Error::not_found(&note.id));
        }
        let updated = notes
            .iter()
            .map(|n| if n.id == note.id { note.clone() } else { n.clone() })
            .collect();
        self.save_and_return(updated)
    }

    async fn delete(&self, notes: &[Note], id: &NoteId) -> Result<Refresh> {
        if !notes.iter().any(|n| &n.id == id) {
            return Err(Error::not_found(id));
        }
        let updated = notes.iter().filter(|n| &n.id != id).cloned().collect();
        self.save_and_return(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::Draft;
    use chrono::{DateTime, TimeZone};

    const KEY: &str = "notes-app-data";

    fn backend(quota: usize) -> LocalBackend {
        LocalBackend::new(KvStore::open_in_memory(quota).unwrap(), KEY.to_string())
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn fields(title: &str, content: &str) -> NoteFields {
        NoteFields::new_at(Draft::new(title, content).validate().unwrap(), at(1_700_000_000))
    }

    fn note(id: i64, title: &str) -> Note {
        Note::from_fields(NoteId::Number(id), fields(title, "body"))
    }

    fn updated(refresh: Refresh) -> Vec<Note> {
        match refresh {
            Refresh::Updated(notes) => notes,
            Refresh::Refetch => panic!("local backend never asks for a refetch"),
        }
    }

    #[test]
    fn test_load_empty_store() {
        assert!(backend(4096).load().unwrap().is_empty());
    }

    #[test]
    fn test_load_corrupt_value_is_an_error() {
        let backend = backend(4096);
        backend.store().set(KEY, "{not json").unwrap();
        assert!(matches!(backend.load(), Err(Error::Json(_))));
    }

    #[test]
    fn test_next_local_id_uses_clock() {
        assert_eq!(next_local_id(&[], 1_000).unwrap(), NoteId::Number(1_000));
        assert_eq!(
            next_local_id(&[note(5, "a")], 1_000).unwrap(),
            NoteId::Number(1_000)
        );
    }

    #[test]
    fn test_next_local_id_never_collides() {
        let notes = vec![note(1_000, "a"), note(1_001, "b")];
        assert_eq!(next_local_id(&notes, 1_000).unwrap(), NoteId::Number(1_002));
    }

    #[tokio::test]
    async fn test_create_after_largest_id_fails_without_writing() {
        let backend = backend(4096);
        let existing = vec![note(i64::MAX, "last")];
        backend.save(&existing).unwrap();

        let err = backend
            .create(&existing, fields("A", "B"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Internal(_)), "{err:?}");
        assert_eq!(backend.load().unwrap(), existing);
    }

    #[tokio::test]
    async fn test_create_appends_and_persists() {
        let backend = backend(4096);
        let existing = vec![note(1, "first")];
        backend.save(&existing).unwrap();

        let notes = updated(backend.create(&existing, fields("A", "B")).await.unwrap());

        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0], existing[0]);
        assert_eq!(notes[1].title, "A");
        assert_eq!(notes[1].content, "B");
        assert_eq!(backend.load().unwrap(), notes);
    }

    #[tokio::test]
    async fn test_update_replaces_in_place() {
        let backend = backend(4096);
        let existing = vec![note(1, "one"), note(2, "two"), note(3, "three")];
        backend.save(&existing).unwrap();

        let mut changed = existing[1].clone();
        changed.title = "TWO".to_string();
        let notes = updated(backend.update(&existing, &changed).await.unwrap());

        assert_eq!(notes.len(), 3);
        assert_eq!(notes[1].title, "TWO");
        assert_eq!(notes[0], existing[0]);
        assert_eq!(notes[2], existing[2]);
        assert_eq!(backend.load().unwrap(), notes);
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let backend = backend(4096);
        let existing = vec![note(1, "one")];
        let err = backend.update(&existing, &note(9, "x")).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        assert!(backend.load().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_exactly_one() {
        let backend = backend(4096);
        let existing = vec![note(1, "one"), note(2, "two"), note(3, "three")];
        backend.save(&existing).unwrap();

        let notes = updated(backend.delete(&existing, &NoteId::Number(2)).await.unwrap());

        assert_eq!(notes, vec![existing[0].clone(), existing[2].clone()]);
        assert_eq!(backend.load().unwrap(), notes);
    }

    #[tokio::test]
    async fn test_delete_unknown_id() {
        let backend = backend(4096);
        let err = backend
            .delete(&[note(1, "one")], &NoteId::Number(2))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_quota_failure_keeps_stored_collection() {
        let backend = backend(400);
        let existing = vec![note(1, "one")];
        backend.save(&existing).unwrap();

        let long = "x".repeat(500);
        let err = backend
            .create(&existing, fields("big", &long))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::QuotaExceeded { .. }));
        assert_eq!(backend.load().unwrap(), existing);
    }

    #[test]
    fn test_location_names_key() {
        assert!(backend(16).location().contains(KEY));
    }
}
