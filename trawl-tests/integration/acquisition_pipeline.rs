//! End-to-end acquisition pipeline tests over the HTTP surface.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use trawl_catalog::{CatalogService, MockProvider};
use trawl_core::config::{ConfigHandle, TrawlConfig};
use trawl_core::ledger::{InMemoryStore, UsageLedger};
use trawl_core::{ContentItem, ContentKind, TransferEngine, spawn_task_engine};
use trawl_web::{AppState, router};

use crate::content_server::{self, payload_for};

fn listed_item(name: &str, size_mb: f64) -> ContentItem {
    ContentItem {
        name: name.to_string(),
        size_mb,
        size_text: format!("{size_mb} MB"),
        source_url: format!("https://catalog.example/f/{name}"),
        kind: ContentKind::Video,
    }
}

fn page_url(name: &str) -> String {
    format!("https://catalog.example/f/{name}")
}

/// Wires the full stack over a scripted provider and in-memory ledgers.
fn test_app(config: TrawlConfig, provider: MockProvider) -> Router {
    let catalog = CatalogService::with_provider(Arc::new(provider));
    let download_ledger = Arc::new(UsageLedger::open(Box::new(InMemoryStore::new())));
    let upload_ledger = Arc::new(UsageLedger::open(Box::new(InMemoryStore::new())));
    let transfer = Arc::new(TransferEngine::new(
        &config.network,
        Arc::new(catalog.clone()),
    ));

    let config = ConfigHandle::new(config);
    let engine = spawn_task_engine(config.clone(), transfer.clone(), download_ledger.clone());

    router(AppState {
        config,
        engine,
        catalog,
        transfer,
        download_ledger,
        upload_ledger,
    })
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn poll_until_terminal(app: &Router, id: &str) -> Value {
    for _ in 0..500 {
        let (status, task) = get_json(app, &format!("/tasks/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        if task["status"] == "completed" || task["status"] == "failed" {
            return task;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("task {id} never reached a terminal state");
}

#[tokio::test]
async fn test_end_to_end_acquisition_scenario() {
    let server = content_server::spawn().await;
    let dir = tempfile::tempdir().unwrap();

    let mut config = TrawlConfig::for_testing(dir.path());
    config.filter.min_size_mb = 5.0;
    config.filter.max_size_mb = Some(500.0);
    config.quota.daily_download_limit_mb = Some(1000.0);

    let provider = MockProvider::new()
        .with_listing(
            ContentKind::Video,
            vec![
                listed_item("tiny.mp4", 2.0),
                listed_item("medium.mp4", 10.0),
                listed_item("huge.mp4", 600.0),
            ],
        )
        .with_direct_url(page_url("medium.mp4"), server.file_url("medium.mp4"));

    let app = test_app(config, provider);

    // Only the 10 MB item survives the size filter
    let (status, listing) = get_json(&app, "/scrape").await;
    assert_eq!(status, StatusCode::OK);
    let videos = listing["videos"].as_array().unwrap();
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0]["name"], "medium.mp4");

    // Submit the filtered item for download
    let (status, submitted) = post_json(&app, "/download", json!({"items": videos})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(submitted["status"], "pending");
    let id = submitted["id"].as_str().unwrap().to_string();

    let task = poll_until_terminal(&app, &id).await;
    assert_eq!(task["status"], "completed");
    assert_eq!(task["progress"], 1.0);
    assert_eq!(task["result"]["success_count"], 1);
    assert_eq!(task["result"]["failed_count"], 0);

    // The transfer consumed quota
    let (_, usage) = get_json(&app, "/usage").await;
    assert_eq!(usage["downloaded"], 10.0);
    assert_eq!(usage["download_remaining"], 990.0);

    // Bytes landed at the final path, and no temp file remains
    let downloaded = dir.path().join("downloads/medium.mp4");
    assert_eq!(
        tokio::fs::read(&downloaded).await.unwrap(),
        payload_for("medium.mp4")
    );
    assert!(!dir.path().join("downloads/medium.mp4.part").exists());

    // The listing endpoint reports the new file
    let (_, downloads) = get_json(&app, "/downloads").await;
    let files = downloads["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["name"], "medium.mp4");
    assert_eq!(files[0]["kind"], "video");
}

#[tokio::test]
async fn test_partial_failure_batch_completes() {
    let server = content_server::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let config = TrawlConfig::for_testing(dir.path());

    // Item "second" has no resolvable direct link; the other two do.
    let provider = MockProvider::new()
        .with_direct_url(page_url("first.mp4"), server.file_url("first.mp4"))
        .with_direct_url(page_url("third.mp4"), server.file_url("third.mp4"));

    let app = test_app(config, provider);

    let items = json!({"items": [
        {"name": "first.mp4", "size_mb": 1.0, "size_text": "1 MB",
         "source_url": page_url("first.mp4"), "kind": "video"},
        {"name": "second.mp4", "size_mb": 1.0, "size_text": "1 MB",
         "source_url": page_url("second.mp4"), "kind": "video"},
        {"name": "third.mp4", "size_mb": 1.0, "size_text": "1 MB",
         "source_url": page_url("third.mp4"), "kind": "video"},
    ]});

    let (_, submitted) = post_json(&app, "/download", items).await;
    let id = submitted["id"].as_str().unwrap().to_string();
    let task = poll_until_terminal(&app, &id).await;

    // One failing item does not fail the batch
    assert_eq!(task["status"], "completed");
    assert_eq!(task["result"]["success_count"], 2);
    assert_eq!(task["result"]["failed_count"], 1);
    assert_eq!(task["completed_count"], 2);

    assert!(dir.path().join("downloads/first.mp4").exists());
    assert!(!dir.path().join("downloads/second.mp4").exists());
    assert!(dir.path().join("downloads/third.mp4").exists());
}

#[tokio::test]
async fn test_quota_exhaustion_fails_remaining_items() {
    let server = content_server::spawn().await;
    let dir = tempfile::tempdir().unwrap();

    let mut config = TrawlConfig::for_testing(dir.path());
    config.quota.daily_download_limit_mb = Some(15.0);

    // Both items resolve; only the first fits the 15 MB daily limit.
    let provider = MockProvider::new()
        .with_direct_url(page_url("fits.mp4"), server.file_url("fits.mp4"))
        .with_direct_url(page_url("over.mp4"), server.file_url("over.mp4"));

    let app = test_app(config, provider);

    let items = json!({"items": [
        {"name": "fits.mp4", "size_mb": 10.0, "size_text": "10 MB",
         "source_url": page_url("fits.mp4"), "kind": "video"},
        {"name": "over.mp4", "size_mb": 10.0, "size_text": "10 MB",
         "source_url": page_url("over.mp4"), "kind": "video"},
    ]});

    let (_, submitted) = post_json(&app, "/download", items).await;
    let id = submitted["id"].as_str().unwrap().to_string();
    let task = poll_until_terminal(&app, &id).await;

    assert_eq!(task["status"], "completed");
    assert_eq!(task["result"]["success_count"], 1);
    assert_eq!(task["result"]["failed_count"], 1);

    // The refused transfer never touched the filesystem or the ledger
    assert!(dir.path().join("downloads/fits.mp4").exists());
    assert!(!dir.path().join("downloads/over.mp4").exists());
    let (_, usage) = get_json(&app, "/usage").await;
    assert_eq!(usage["downloaded"], 10.0);
    assert_eq!(usage["download_remaining"], 5.0);
}
