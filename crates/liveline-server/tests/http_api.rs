//! End-to-end HTTP tests against a spawned server instance.

use futures_util::StreamExt;
use liveline_db::{create_pool, run_migrations, DbRuntimeSettings};
use liveline_feed::FeedHub;
use liveline_server::{app, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::timeout;

/// Spawns a server on an ephemeral port backed by a file database in a
/// temp dir. Returns the base URL; the `TempDir` guard keeps the files
/// alive for the test's duration.
async fn spawn_app() -> (String, TempDir) {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let db_path = dir.path().join("liveline.db");

    let pool = create_pool(
        db_path.to_str().expect("path should be utf-8"),
        DbRuntimeSettings::default(),
    )
    .expect("should create pool");
    {
        let conn = pool.get().expect("should get connection");
        run_migrations(&conn).expect("should run migrations");
    }

    let state = AppState {
        pool,
        hub: Arc::new(FeedHub::new()),
        upload_dir: dir
            .path()
            .join("uploads")
            .to_string_lossy()
            .into_owned(),
        upload_max_bytes: 10 * 1024 * 1024,
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("should bind ephemeral port");
    let addr = listener.local_addr().expect("should read local addr");
    let router = app(state);

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server error");
    });

    (format!("http://{addr}"), dir)
}

async fn create_live_event(client: &reqwest::Client, base: &str, title: &str) -> Value {
    let event: Value = client
        .post(format!("{base}/api/events"))
        .json(&json!({ "title": title, "authorId": "editor-1" }))
        .send()
        .await
        .expect("create request")
        .json()
        .await
        .expect("create body");

    let event_id = event["eventId"].as_str().expect("eventId");
    let resp = client
        .patch(format!("{base}/api/events/{event_id}/status"))
        .json(&json!({ "status": "live" }))
        .send()
        .await
        .expect("status request");
    assert_eq!(resp.status(), 200);

    event
}

async fn push_text_update(client: &reqwest::Client, base: &str, event_id: &str, content: &str) {
    let resp = client
        .post(format!("{base}/api/events/{event_id}/updates"))
        .json(&json!({
            "content": content,
            "kind": "text",
            "authorId": "editor-1",
            "authorName": "Desk",
        }))
        .send()
        .await
        .expect("push request");
    assert_eq!(resp.status(), 201);
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let (base, _guard) = spawn_app().await;
    let client = reqwest::Client::new();

    let body: Value = client
        .get(format!("{base}/health"))
        .send()
        .await
        .expect("health request")
        .json()
        .await
        .expect("health body");

    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn election_night_flow() {
    let (base, _guard) = spawn_app().await;
    let client = reqwest::Client::new();

    // Create the event.
    let resp = client
        .post(format!("{base}/api/events"))
        .json(&json!({
            "title": "Election Night",
            "slug": "election-night",
            "authorId": "editor-1",
        }))
        .send()
        .await
        .expect("create request");
    assert_eq!(resp.status(), 201);
    let event: Value = resp.json().await.expect("create body");
    assert_eq!(event["status"], "upcoming");
    assert_eq!(event["slug"], "election-night");
    let event_id = event["eventId"].as_str().expect("eventId").to_string();

    // Posting before going live is rejected.
    let resp = client
        .post(format!("{base}/api/events/{event_id}/updates"))
        .json(&json!({
            "content": "early",
            "kind": "text",
            "authorId": "editor-1",
            "authorName": "Desk",
        }))
        .send()
        .await
        .expect("push request");
    assert_eq!(resp.status(), 409);

    // Go live and post three updates.
    let resp = client
        .patch(format!("{base}/api/events/{event_id}/status"))
        .json(&json!({ "status": "live" }))
        .send()
        .await
        .expect("status request");
    assert_eq!(resp.status(), 200);

    push_text_update(&client, &base, &event_id, "Polls open").await;
    push_text_update(&client, &base, &event_id, "Turnout high in District 4").await;
    let resp = client
        .post(format!("{base}/api/events/{event_id}/updates"))
        .json(&json!({
            "content": "Candidate X leads",
            "kind": "breaking",
            "authorId": "editor-2",
            "authorName": "Field",
        }))
        .send()
        .await
        .expect("push request");
    assert_eq!(resp.status(), 201);

    // A fresh read sees all three, newest first.
    let updates: Value = client
        .get(format!("{base}/api/events/{event_id}/updates"))
        .send()
        .await
        .expect("list request")
        .json()
        .await
        .expect("list body");
    let contents: Vec<&str> = updates
        .as_array()
        .expect("array")
        .iter()
        .map(|u| u["content"].as_str().expect("content"))
        .collect();
    assert_eq!(
        contents,
        vec!["Candidate X leads", "Turnout high in District 4", "Polls open"]
    );

    // The public route resolves by slug.
    let by_slug: Value = client
        .get(format!("{base}/api/events/slug/election-night"))
        .send()
        .await
        .expect("slug request")
        .json()
        .await
        .expect("slug body");
    assert_eq!(by_slug["eventId"], event_id.as_str());

    // End coverage; the log freezes.
    let resp = client
        .patch(format!("{base}/api/events/{event_id}/status"))
        .json(&json!({ "status": "ended" }))
        .send()
        .await
        .expect("status request");
    assert_eq!(resp.status(), 200);
    let ended: Value = resp.json().await.expect("status body");
    assert!(ended["endedAt"].is_string(), "ending stamps endedAt");

    let resp = client
        .post(format!("{base}/api/events/{event_id}/updates"))
        .json(&json!({
            "content": "too late",
            "kind": "text",
            "authorId": "editor-1",
            "authorName": "Desk",
        }))
        .send()
        .await
        .expect("push request");
    assert_eq!(resp.status(), 409, "appending to an ended event is rejected");

    // Re-opening is rejected.
    let resp = client
        .patch(format!("{base}/api/events/{event_id}/status"))
        .json(&json!({ "status": "live" }))
        .send()
        .await
        .expect("status request");
    assert_eq!(resp.status(), 409);
}

#[tokio::test]
async fn unknown_event_is_not_found() {
    let (base, _guard) = spawn_app().await;
    let client = reqwest::Client::new();

    for url in [
        format!("{base}/api/events/nope"),
        format!("{base}/api/events/nope/updates"),
        format!("{base}/api/events/nope/viewers"),
        format!("{base}/api/events/slug/nope"),
    ] {
        let resp = client.get(&url).send().await.expect("request");
        assert_eq!(resp.status(), 404, "expected 404 from {url}");
    }
}

#[tokio::test]
async fn empty_title_is_rejected() {
    let (base, _guard) = spawn_app().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/events"))
        .json(&json!({ "title": "   ", "authorId": "editor-1" }))
        .send()
        .await
        .expect("create request");
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn viewers_start_at_zero() {
    let (base, _guard) = spawn_app().await;
    let client = reqwest::Client::new();

    let event = create_live_event(&client, &base, "Quiet Event").await;
    let event_id = event["eventId"].as_str().expect("eventId");

    let body: Value = client
        .get(format!("{base}/api/events/{event_id}/viewers"))
        .send()
        .await
        .expect("viewers request")
        .json()
        .await
        .expect("viewers body");
    assert_eq!(body["viewers"], 0);
}

#[tokio::test]
async fn sse_stream_opens_with_the_current_snapshot() {
    let (base, _guard) = spawn_app().await;
    let client = reqwest::Client::new();

    let event = create_live_event(&client, &base, "Storm Coverage").await;
    let event_id = event["eventId"].as_str().expect("eventId");
    push_text_update(&client, &base, event_id, "Landfall expected at noon").await;

    let resp = client
        .get(format!("{base}/api/events/{event_id}/stream"))
        .send()
        .await
        .expect("stream request");
    assert_eq!(resp.status(), 200);
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/event-stream"));

    let mut stream = resp.bytes_stream();
    let first = timeout(Duration::from_secs(5), stream.next())
        .await
        .expect("initial snapshot should arrive promptly")
        .expect("stream should be open")
        .expect("chunk should be readable");
    let frame = String::from_utf8_lossy(&first);
    assert!(frame.contains("event: snapshot"), "got frame: {frame}");
    assert!(frame.contains("Landfall expected at noon"), "got frame: {frame}");
}

#[tokio::test]
async fn upload_roundtrip_stores_and_serves_the_file() {
    let (base, _guard) = spawn_app().await;
    let client = reqwest::Client::new();

    // Minimal PNG magic plus padding; the handler sniffs bytes, not names.
    let mut png = vec![137u8, 80, 78, 71, 13, 10, 26, 10];
    png.extend_from_slice(&[0u8; 32]);

    let form = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(png.clone()).file_name("crowd.png"),
    );

    let resp = client
        .post(format!("{base}/api/upload"))
        .multipart(form)
        .send()
        .await
        .expect("upload request");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("upload body");
    let url = body["url"].as_str().expect("url");
    assert!(url.starts_with("/uploads/"));
    assert!(url.ends_with(".png"));

    let served = client
        .get(format!("{base}{url}"))
        .send()
        .await
        .expect("serve request");
    assert_eq!(served.status(), 200);
    let bytes = served.bytes().await.expect("served bytes");
    assert_eq!(bytes.as_ref(), png.as_slice());
}

#[tokio::test]
async fn upload_rejects_non_images() {
    let (base, _guard) = spawn_app().await;
    let client = reqwest::Client::new();

    let form = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(b"#!/bin/sh\necho hi\n".to_vec()).file_name("evil.png"),
    );

    let resp = client
        .post(format!("{base}/api/upload"))
        .multipart(form)
        .send()
        .await
        .expect("upload request");
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn deleting_an_event_removes_it_and_its_log() {
    let (base, _guard) = spawn_app().await;
    let client = reqwest::Client::new();

    let event = create_live_event(&client, &base, "Short Lived").await;
    let event_id = event["eventId"].as_str().expect("eventId");
    push_text_update(&client, &base, event_id, "only entry").await;

    let resp = client
        .delete(format!("{base}/api/events/{event_id}"))
        .send()
        .await
        .expect("delete request");
    assert_eq!(resp.status(), 204);

    let resp = client
        .get(format!("{base}/api/events/{event_id}"))
        .send()
        .await
        .expect("get request");
    assert_eq!(resp.status(), 404);
}
