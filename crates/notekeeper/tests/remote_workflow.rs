//! Editor and viewer against a live notes server on an ephemeral port.

use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{FixedOffset, TimeZone, Utc};
use serde_json::json;

use notekeeper::config::DisplayConfig;
use notekeeper::editor::{LoadStatus, Mode};
use notekeeper::{
    AutoAnswer, DeleteOutcome, Error, NoteEditor, RemoteBackend, Renderer, SaveOutcome, Viewer,
};

async fn spawn_router(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/notes")
}

async fn spawn_server(seed: serde_json::Value) -> String {
    let db = notekeeper_server::Database::from_value(seed).unwrap();
    spawn_router(notekeeper_server::router(db)).await
}

fn seed() -> serde_json::Value {
    json!({
        "notes": [{
            "id": 1,
            "title": "Groceries",
            "content": "milk",
            "createdAt": "2024-06-10T08:00:00Z",
            "updatedAt": "2024-06-10T08:00:00Z"
        }]
    })
}

fn renderer() -> Renderer {
    Renderer::new(&DisplayConfig::default()).with_offset(FixedOffset::east_opt(0).unwrap())
}

fn unused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/notes")
}

#[tokio::test]
async fn test_create_edit_delete_round_trip() {
    let base = spawn_server(seed()).await;
    let mut editor = NoteEditor::open(RemoteBackend::new(base, None)).await;
    assert_eq!(editor.state().load_status(), &LoadStatus::Ready);
    assert_eq!(editor.state().notes().len(), 1);

    // Create
    editor.new_note();
    editor.set_title("Ideas");
    editor.set_content("write more tests");
    assert_eq!(editor.save().await.unwrap(), SaveOutcome::Created);
    assert_eq!(editor.state().notes().len(), 2);
    assert_eq!(editor.state().mode(), Mode::Composing);
    let created = editor.state().notes()[1].clone();
    assert_eq!(created.title, "Ideas");
    assert_eq!(created.id.as_number(), Some(2));

    // Update keeps the id and createdAt
    editor.select(&created.id).unwrap();
    editor.set_content("write even more tests");
    assert_eq!(
        editor.save().await.unwrap(),
        SaveOutcome::Updated(created.id.clone())
    );
    let updated = editor.state().notes()[1].clone();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.content, "write even more tests");
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(editor.state().mode(), Mode::Editing);

    // Delete
    let outcome = editor.delete(&mut AutoAnswer(true)).await.unwrap();
    assert_eq!(outcome, DeleteOutcome::Deleted(created.id));
    assert_eq!(editor.state().notes().len(), 1);
    assert_eq!(editor.state().notes()[0].title, "Groceries");
    assert_eq!(editor.state().mode(), Mode::Browsing);
}

#[tokio::test]
async fn test_refetch_delay_is_honoured() {
    let base = spawn_server(seed()).await;
    let delay = std::time::Duration::from_millis(50);
    let mut editor = NoteEditor::open(RemoteBackend::new(base, Some(delay))).await;

    editor.new_note();
    editor.set_title("Later");
    editor.set_content("eventually");
    let started = std::time::Instant::now();
    editor.save().await.unwrap();

    assert!(started.elapsed() >= delay);
    assert_eq!(editor.state().notes().len(), 2);
}

#[tokio::test]
async fn test_server_error_on_create_keeps_state() {
    let listing = json!([{
        "id": 1,
        "title": "Only",
        "content": "one",
        "createdAt": "2024-06-10T08:00:00Z",
        "updatedAt": "2024-06-10T08:00:00Z"
    }]);
    let app = Router::new().route(
        "/notes",
        get(move || {
            let listing = listing.clone();
            async move { Json(listing) }
        })
        .post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let base = spawn_router(app).await;

    let mut editor = NoteEditor::open(RemoteBackend::new(base, None)).await;
    editor.new_note();
    editor.set_title("A");
    editor.set_content("B");
    let before = editor.state().clone();

    let err = editor.save().await.unwrap_err();

    assert!(matches!(err, Error::ServerStatus { status: 500, .. }), "{err:?}");
    assert!(err.user_message().contains("500"));
    assert_eq!(editor.state(), &before);
    assert_eq!(editor.state().notes().len(), 1);
}

#[tokio::test]
async fn test_unreachable_server() {
    let base = unused_url();
    let mut editor = NoteEditor::open(RemoteBackend::new(base.clone(), None)).await;

    // Listing degrades instead of failing
    assert!(editor.state().load_status().is_degraded());
    assert!(editor.state().notes().is_empty());

    editor.new_note();
    editor.set_title("A");
    editor.set_content("B");
    let err = editor.save().await.unwrap_err();

    assert!(matches!(err, Error::ServerUnreachable { .. }), "{err:?}");
    assert!(err.user_message().contains(&base));
    assert_eq!(editor.state().draft().title, "A");
}

#[tokio::test]
async fn test_delete_of_vanished_note_reports_404() {
    let base = spawn_server(seed()).await;
    let mut editor = NoteEditor::open(RemoteBackend::new(base.clone(), None)).await;
    editor.select_index(0).unwrap();

    // Someone else removes it first
    reqwest::Client::new()
        .delete(format!("{base}/1"))
        .send()
        .await
        .unwrap();

    let err = editor.delete(&mut AutoAnswer(true)).await.unwrap_err();
    assert!(matches!(err, Error::ServerStatus { status: 404, .. }), "{err:?}");
    assert_eq!(editor.state().mode(), Mode::Editing);
}

#[tokio::test]
async fn test_viewer_lists_server_notes() {
    let base = spawn_server(seed()).await;
    let viewer = Viewer::new(RemoteBackend::new(base, None));

    let out = viewer.render(&renderer()).await;

    assert_eq!(out, "Groceries\n  milk\n  Created: 10/06/2024\n");
}

#[tokio::test]
async fn test_viewer_unreachable_shows_nothing() {
    let viewer = Viewer::new(RemoteBackend::new(unused_url(), None));
    assert!(viewer.load().await.is_empty());
}

#[test]
fn test_wire_dates_are_rfc3339() {
    let at = Utc.with_ymd_and_hms(2024, 6, 10, 8, 0, 0).unwrap();
    let value = serde_json::to_value(at).unwrap();
    assert_eq!(value, json!("2024-06-10T08:00:00Z"));
}
