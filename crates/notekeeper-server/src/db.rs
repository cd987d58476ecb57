//! In-memory resource collections with optional JSON file persistence.
//!
//! The file holds one object whose keys are resource names and whose values
//! are arrays of items, e.g. `{"notes": [{"id": 1, ...}]}`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Result, ServerError};

/// Named collections of JSON objects, each carrying an `id`.
#[derive(Debug, Clone, Default)]
pub struct Database {
    collections: BTreeMap<String, Vec<Value>>,
    path: Option<PathBuf>,
}

fn id_matches(item: &Value, id: &str) -> bool {
    match item.get("id") {
        Some(Value::Number(n)) => n.to_string() == id,
        Some(Value::String(s)) => s == id,
        _ => false,
    }
}

fn not_found(resource: &str, id: &str) -> ServerError {
    ServerError::NotFound {
        resource: resource.to_string(),
        id: id.to_string(),
    }
}

fn id_text(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Database {
    /// An empty database that is never written to disk.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Build a database from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidDatabase`] unless `doc` is an object of
    /// arrays.
    pub fn from_value(doc: Value) -> Result<Self> {
        let Value::Object(collections) = doc else {
            return Err(ServerError::InvalidDatabase(
                "top level must be an object".to_string(),
            ));
        };
        let collections = collections
            .into_iter()
            .map(|(name, items)| match items {
                Value::Array(items) => Ok((name, items)),
                _ => Err(ServerError::InvalidDatabase(format!(
                    "'{name}' must be an array"
                ))),
            })
            .collect::<Result<_>>()?;
        Ok(Self {
            collections,
            path: None,
        })
    }

    /// Load the database from `path`, starting empty if the file is missing.
    /// Every write is saved back to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut db = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => Self::from_value(serde_json::from_str(&raw)?)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} does not exist, starting empty", path.display());
                Self::default()
            }
            Err(e) => return Err(e.into()),
        };
        db.path = Some(path);
        Ok(db)
    }

    /// File the database is saved to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Names of the known resources.
    #[must_use]
    pub fn resources(&self) -> Vec<&str> {
        self.collections.keys().map(String::as_str).collect()
    }

    fn items(&self, resource: &str) -> &[Value] {
        self.collections.get(resource).map_or(&[], Vec::as_slice)
    }

    fn items_mut(&mut self, resource: &str) -> &mut Vec<Value> {
        self.collections.entry(resource.to_string()).or_default()
    }

    /// All items of `resource`; empty for unknown resources.
    #[must_use]
    pub fn list(&self, resource: &str) -> Vec<Value> {
        self.items(resource).to_vec()
    }

    /// The item of `resource` with `id`.
    #[must_use]
    pub fn get(&self, resource: &str, id: &str) -> Option<&Value> {
        self.items(resource).iter().find(|item| id_matches(item, id))
    }

    /// Append `body` to `resource`, giving it the next numeric id unless it
    /// brings its own.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Conflict`] if the body's own id is taken, or
    /// [`ServerError::BadRequest`] if the numeric ids are exhausted.
    pub fn insert(&mut self, resource: &str, mut body: Map<String, Value>) -> Result<Value> {
        match body.get("id").filter(|id| !id.is_null()) {
            Some(id) => {
                let id = id_text(id);
                if self.get(resource, &id).is_some() {
                    return Err(ServerError::Conflict {
                        resource: resource.to_string(),
                        id,
                    });
                }
            }
            None => {
                let highest = self
                    .items(resource)
                    .iter()
                    .filter_map(|item| item.get("id").and_then(Value::as_i64))
                    .max();
                let next = match highest {
                    None => 1,
                    Some(max) => max.checked_add(1).ok_or_else(|| {
                        ServerError::BadRequest(format!(
                            "no numeric id left after {max} in '{resource}', supply an id"
                        ))
                    })?,
                };
                body.insert("id".to_string(), Value::from(next));
            }
        }

        let item = Value::Object(body);
        self.items_mut(resource).push(item.clone());
        Ok(item)
    }

    /// Replace the item with `id` by `body`, keeping the stored id.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::NotFound`] if there is no such item.
    pub fn replace(
        &mut self,
        resource: &str,
        id: &str,
        mut body: Map<String, Value>,
    ) -> Result<Value> {
        let Some(slot) = self
            .collections
            .get_mut(resource)
            .and_then(|items| items.iter_mut().find(|item| id_matches(item, id)))
        else {
            return Err(not_found(resource, id));
        };
        let stored_id = slot.get("id").cloned().unwrap_or(Value::Null);
        body.insert("id".to_string(), stored_id);
        *slot = Value::Object(body);
        Ok(slot.clone())
    }

    /// Remove and return the item with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::NotFound`] if there is no such item.
    pub fn remove(&mut self, resource: &str, id: &str) -> Result<Value> {
        let items = self
            .collections
            .get_mut(resource)
            .ok_or_else(|| not_found(resource, id))?;
        let index = items
            .iter()
            .position(|item| id_matches(item, id))
            .ok_or_else(|| not_found(resource, id))?;
        Ok(items.remove(index))
    }

    /// Run `change` against a copy of the database and adopt the copy only
    /// once it has been written to the file. On any error the database is
    /// left as it was.
    ///
    /// # Errors
    ///
    /// Returns the error from `change` or from [`Database::persist`].
    pub async fn commit<T>(&mut self, change: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let mut candidate = self.clone();
        let out = change(&mut candidate)?;
        candidate.persist().await?;
        *self = candidate;
        Ok(out)
    }

    /// Write the database to its file, if it has one.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    pub async fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let raw = serde_json::to_string_pretty(&self.collections)?;
        tokio::fs::write(path, raw).await?;
        debug!("Saved database to {}", path.display());
        Ok(())
    }
}
