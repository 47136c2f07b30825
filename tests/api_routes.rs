use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::Value;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use ipheno::inventory::{
    Candidate, IndexStore, InventoryBuilder, InventoryConfig, InventoryError, Prober,
};
use ipheno::server::{router, AppState};

/// Answers from a fixed table keyed by filename.
struct TableProber(Vec<(&'static str, &'static str)>);

#[async_trait]
impl Prober for TableProber {
    async fn probe(&self, candidate: &Candidate) -> Result<String, InventoryError> {
        self.0
            .iter()
            .find(|(name, _)| *name == candidate.filename)
            .map(|(_, output)| output.to_string())
            .ok_or_else(|| InventoryError::ProbeFailed {
                filename: candidate.filename.clone(),
                reason: "exit status 1".to_string(),
            })
    }
}

fn app(temp: &TempDir, files: &[&str], replies: Vec<(&'static str, &'static str)>) -> axum::Router {
    let models_dir = temp.path().join("models");
    fs::create_dir_all(&models_dir).unwrap();
    for file in files {
        fs::write(models_dir.join(file), b"").unwrap();
    }
    let builder = InventoryBuilder::new(
        InventoryConfig::default(),
        Arc::new(TableProber(replies)),
        IndexStore::new(temp.path().join("models.json")),
    );
    router(Arc::new(AppState {
        builder,
        models_dir,
        known_operations: vec!["csv".to_string(), "json".to_string()],
    }))
}

async fn send(app: &axum::Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_index_is_unavailable_before_first_check() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp, &["root_a.exe"], vec![]);

    let (status, body) = send(&app, Method::GET, "/api/v1/models").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("could not be read"));
}

#[tokio::test]
async fn test_corrupt_index_is_reported() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp, &[], vec![]);
    fs::write(temp.path().join("models.json"), "[1, 2").unwrap();

    let (status, body) = send(&app, Method::GET, "/api/v1/models").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_check_then_fetch_index() {
    let temp = TempDir::new().unwrap();
    let app = app(
        &temp,
        &["root_a.exe", "leaves_b.exe", "readme.md"],
        vec![("root_a.exe", "*Root A*CNN*1*Set*eval_a.exe*"), ("leaves_b.exe", "*B*")],
    );

    let (status, body) = send(&app, Method::POST, "/api/v1/models/check").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["root"], 1);
    assert_eq!(body["data"]["leaves"], 1);
    assert_eq!(body["data"]["described"], 1);
    assert_eq!(body["data"]["failed"][0], "leaves_b");

    let (status, body) = send(&app, Method::GET, "/api/v1/models").await;
    assert_eq!(status, StatusCode::OK);
    let index = &body["data"];
    assert_eq!(index["root"][0], "root_a");
    assert_eq!(index["leaves"][0], "leaves_b");
    assert_eq!(index["details"]["root_a"]["display_name"], "Root A");
    assert!(index["details"].get("leaves_b").is_none());
}

#[tokio::test]
async fn test_validate_returns_bare_result() {
    let temp = TempDir::new().unwrap();
    let app = app(
        &temp,
        &["root_a.exe", "leaves_b.exe"],
        vec![("root_a.exe", "*A*"), ("leaves_b.exe", "no fields")],
    );

    let (status, body) = send(&app, Method::GET, "/api/v1/models/validate").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "error");
    assert_eq!(body["invalidExecutables"], serde_json::json!(["leaves_b.exe"]));
}

#[tokio::test]
async fn test_validate_empty_directory_is_good() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp, &[], vec![]);

    let (status, body) = send(&app, Method::GET, "/api/v1/models/validate").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({"status": "good"}));
}

#[tokio::test]
async fn test_operations_merge_models_and_configured_ids() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp, &["root_a.exe", "leaves_b.exe"], vec![]);

    let (_, body) = send(&app, Method::GET, "/api/v1/operations").await;
    assert_eq!(body["data"], serde_json::json!(["csv", "json"]));

    send(&app, Method::POST, "/api/v1/models/check").await;
    let (_, body) = send(&app, Method::GET, "/api/v1/operations").await;
    assert_eq!(body["data"], serde_json::json!(["csv", "json", "leaves_b", "root_a"]));
}

#[tokio::test]
async fn test_check_on_missing_directory_fails() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp, &[], vec![]);
    fs::remove_dir(temp.path().join("models")).unwrap();

    let (status, body) = send(&app, Method::POST, "/api/v1/models/check").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"].as_str().unwrap().contains("Models directory unavailable"));
}
