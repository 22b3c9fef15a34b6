//! Integration tests for the student API.
//!
//! Each test drives the full router against a store in its own temporary
//! directory. Run with: cargo test --test integration

use std::path::{Path, PathBuf};

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::TempDir;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tower::ServiceExt;

use student_api::api::{create_router, AppState};
use student_api::store::Store;

struct TestApp {
    dir: TempDir,
    router: Router,
}

impl TestApp {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let router = create_router(AppState::new(Store::new(students_path(dir.path()))));
        Self { dir, router }
    }

    fn file(&self) -> PathBuf {
        students_path(self.dir.path())
    }

    async fn post(&self, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/students")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn list(&self) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri("/api/students")
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}

fn students_path(dir: &Path) -> PathBuf {
    dir.join("data").join("students.json")
}

/// Test the create-then-list flow for a single valid student.
#[tokio::test]
async fn test_create_then_list() {
    let app = TestApp::new();
    let before = OffsetDateTime::now_utc().replace_nanosecond(0).unwrap();

    let (status, created) = app
        .post(json!({ "name": "Ana", "age": 20, "course": "CS", "year": "2" }))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Ana");
    assert_eq!(created["age"], 20);
    assert_eq!(created["course"], "CS");
    assert_eq!(created["year"], "2");
    assert_eq!(created["status"], "active");
    assert!(created["id"].as_str().is_some_and(|id| !id.is_empty()));

    let created_at =
        OffsetDateTime::parse(created["createdAt"].as_str().unwrap(), &Rfc3339).unwrap();
    assert!(created_at >= before);

    let (status, listed) = app.list().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([created]));
}

/// Test that listing an untouched store returns an empty array.
#[tokio::test]
async fn test_list_empty() {
    let app = TestApp::new();

    let (status, listed) = app.list().await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([]));
}

/// Test that records come back in creation order with unique ids.
#[tokio::test]
async fn test_list_preserves_creation_order() {
    let app = TestApp::new();
    let names = ["Ana", "Bo", "Cy", "Di"];

    for (i, name) in names.iter().enumerate() {
        let (status, _) = app
            .post(json!({ "name": name, "age": 18 + i, "course": "CS", "year": "1" }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, listed) = app.list().await;
    let listed = listed.as_array().unwrap();
    let listed_names: Vec<_> = listed.iter().map(|s| s["name"].as_str().unwrap()).collect();
    assert_eq!(listed_names, names);

    let mut ids: Vec<_> = listed.iter().map(|s| s["id"].as_str().unwrap()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), names.len());
}

/// Test that every validation failure is a 400 and leaves the file untouched.
#[tokio::test]
async fn test_validation_failures_do_not_write() {
    let app = TestApp::new();
    app.post(json!({ "name": "Ana", "age": 20, "course": "CS", "year": "2" }))
        .await;
    let before = std::fs::read(app.file()).unwrap();

    let cases = [
        (
            json!({ "age": 20, "course": "CS", "year": "2" }),
            "Name is required and cannot be blank.",
        ),
        (
            json!({ "name": "Bo", "age": 20, "course": "  ", "year": "2" }),
            "Course is required and cannot be blank.",
        ),
        (
            json!({ "name": "Bo", "age": 20, "course": "CS" }),
            "Year is required and cannot be blank.",
        ),
        (
            json!({ "name": "Bo", "age": "abc", "course": "CS", "year": "1" }),
            "Age is required and must be a number greater than 0.",
        ),
        (
            json!({ "name": "Bo", "age": -1, "course": "CS", "year": "1" }),
            "Age is required and must be a number greater than 0.",
        ),
    ];

    for (body, message) in cases {
        let (status, response) = app.post(body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, json!({ "error": message }));
    }

    assert_eq!(std::fs::read(app.file()).unwrap(), before);
}

/// Test that an explicit status is kept and trimmed.
#[tokio::test]
async fn test_explicit_status_is_preserved() {
    let app = TestApp::new();

    let (status, created) = app
        .post(json!({
            "name": "Ana",
            "age": "22",
            "course": "Math",
            "year": "4",
            "status": " graduated "
        }))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "graduated");
    assert_eq!(created["age"], 22);
}

/// Test recovery when the store file is replaced with invalid JSON.
#[tokio::test]
async fn test_corrupt_file_recovery() {
    let app = TestApp::new();
    app.post(json!({ "name": "Ana", "age": 20, "course": "CS", "year": "2" }))
        .await;
    std::fs::write(app.file(), "this is not json").unwrap();

    let (status, listed) = app.list().await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([]));

    let backups: Vec<_> = std::fs::read_dir(app.file().parent().unwrap())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("students.json.corrupt."))
        })
        .collect();
    assert_eq!(backups.len(), 1);
    assert_eq!(
        std::fs::read_to_string(&backups[0]).unwrap(),
        "this is not json"
    );
}

/// Test that a valid hand-edited file is listed and appended to unchanged.
#[tokio::test]
async fn test_hand_edited_records_survive_list_and_append() {
    let app = TestApp::new();
    let legacy = json!({
        "id": "1",
        "name": "Ana",
        "age": 20,
        "course": "CS",
        "year": "2",
        "status": "active",
        "createdAt": "2024-01-01T00:00:00.000Z",
        "email": "a@x"
    });
    std::fs::create_dir_all(app.file().parent().unwrap()).unwrap();
    std::fs::write(app.file(), json!([legacy]).to_string()).unwrap();

    let (status, listed) = app.list().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([legacy]));

    let (status, created) = app
        .post(json!({ "name": "Bo", "age": 21, "course": "Math", "year": "1" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, listed) = app.list().await;
    assert_eq!(listed, json!([legacy, created]));

    let raw = std::fs::read_to_string(app.file()).unwrap();
    let on_disk: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(on_disk, json!([legacy, created]));
}

/// Test that the persisted file is a pretty-printed array matching the API.
#[tokio::test]
async fn test_persisted_layout() {
    let app = TestApp::new();
    let (_, created) = app
        .post(json!({ "name": "Ana", "age": 20, "course": "CS", "year": "2" }))
        .await;

    let raw = std::fs::read_to_string(app.file()).unwrap();
    assert!(raw.starts_with("[\n  {"));

    let on_disk: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(on_disk, json!([created]));
}

/// Test that parallel creations are all persisted.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_are_not_lost() {
    let app = std::sync::Arc::new(TestApp::new());

    let tasks: Vec<_> = (0..20)
        .map(|i| {
            let app = app.clone();
            tokio::spawn(async move {
                app.post(json!({ "name": format!("s{i}"), "age": 20, "course": "CS", "year": "1" }))
                    .await
            })
        })
        .collect();
    for task in tasks {
        let (status, _) = task.await.unwrap();
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, listed) = app.list().await;
    assert_eq!(listed.as_array().unwrap().len(), 20);
}
