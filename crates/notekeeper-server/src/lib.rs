//! `notekeeper-server` - a small REST server for JSON resource collections
//!
//! Serves every top-level collection of a [`Database`] under `/<resource>`:
//!
//! - `GET /<resource>` lists the items (an unknown resource is empty)
//! - `GET /<resource>/<id>` returns one item
//! - `POST /<resource>` stores an item and assigns the next numeric id
//! - `PUT /<resource>/<id>` replaces an item, keeping its id
//! - `DELETE /<resource>/<id>` removes an item and returns it
//!
//! Intended for development against the notekeeper remote backend.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod db;
pub mod error;

use std::future::Future;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Map, Value};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tracing::{debug, info};

pub use db::Database;
pub use error::{Result, ServerError};

type SharedDb = Arc<RwLock<Database>>;

/// Build the router serving `db`.
pub fn router(db: Database) -> Router {
    let state: SharedDb = Arc::new(RwLock::new(db));
    Router::new()
        .route("/:resource", get(list_items).post(create_item))
        .route(
            "/:resource/:id",
            get(get_item).put(replace_item).delete(delete_item),
        )
        .with_state(state)
}

/// Serve `db` on `listener` until the process ends.
///
/// # Errors
///
/// Returns an error if the listener fails.
pub async fn serve(listener: TcpListener, db: Database) -> std::io::Result<()> {
    serve_until(listener, db, std::future::pending()).await
}

/// Serve `db` on `listener` until `shutdown` completes.
///
/// # Errors
///
/// Returns an error if the listener fails.
pub async fn serve_until<F>(
    listener: TcpListener,
    db: Database,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    match db.path() {
        Some(path) => info!("Serving {} on http://{}", path.display(), addr),
        None => info!("Serving in-memory database on http://{}", addr),
    }
    debug!("Resources: {:?}", db.resources());
    axum::serve(listener, router(db))
        .with_graceful_shutdown(shutdown)
        .await
}

fn object_body(body: Value) -> Result<Map<String, Value>> {
    match body {
        Value::Object(map) => Ok(map),
        other => Err(ServerError::BadRequest(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

async fn list_items(
    State(db): State<SharedDb>,
    Path(resource): Path<String>,
) -> Json<Vec<Value>> {
    let items = db.read().await.list(&resource);
    debug!("GET /{} -> {} items", resource, items.len());
    Json(items)
}

async fn get_item(
    State(db): State<SharedDb>,
    Path((resource, id)): Path<(String, String)>,
) -> Result<Json<Value>> {
    let db = db.read().await;
    let item = db.get(&resource, &id).cloned().ok_or(ServerError::NotFound {
        resource,
        id,
    })?;
    Ok(Json(item))
}

async fn create_item(
    State(db): State<SharedDb>,
    Path(resource): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse> {
    let body = object_body(body)?;
    let item = db
        .write()
        .await
        .commit(|db| db.insert(&resource, body))
        .await?;
    debug!("POST /{} -> id {}", resource, item["id"]);
    Ok((StatusCode::CREATED, Json(item)))
}

async fn replace_item(
    State(db): State<SharedDb>,
    Path((resource, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>> {
    let body = object_body(body)?;
    let item = db
        .write()
        .await
        .commit(|db| db.replace(&resource, &id, body))
        .await?;
    debug!("PUT /{}/{}", resource, id);
    Ok(Json(item))
}

async fn delete_item(
    State(db): State<SharedDb>,
    Path((resource, id)): Path<(String, String)>,
) -> Result<Json<Value>> {
    let item = db
        .write()
        .await
        .commit(|db| db.remove(&resource, &id))
        .await?;
    debug!("DELETE /{}/{}", resource, id);
    Ok(Json(item))
}
