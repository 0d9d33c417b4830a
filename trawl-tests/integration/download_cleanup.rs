//! Partial-download cleanup behavior of the transfer engine.

use std::sync::Arc;

use trawl_catalog::{CatalogService, MockProvider};
use trawl_core::config::TrawlConfig;
use trawl_core::{ContentItem, ContentKind, TransferEngine, TransferError};

use crate::content_server;

fn item(name: &str, page_url: &str) -> ContentItem {
    ContentItem {
        name: name.to_string(),
        size_mb: 1.0,
        size_text: "1 MB".to_string(),
        source_url: page_url.to_string(),
        kind: ContentKind::File,
    }
}

fn engine_over(provider: MockProvider) -> TransferEngine {
    let catalog = CatalogService::with_provider(Arc::new(provider));
    TransferEngine::new(&TrawlConfig::default().network, Arc::new(catalog))
}

#[tokio::test]
async fn test_mid_stream_failure_leaves_no_file() {
    let server = content_server::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("downloads");

    let page = "https://catalog.example/f/broken.bin";
    let provider = MockProvider::new().with_direct_url(page, server.broken_url());
    let engine = engine_over(provider);

    let err = engine
        .download(&item("broken.bin", page), &dest)
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::Http { .. }));

    // Neither the final path nor any partial output survives the failure
    assert!(!dest.join("broken.bin").exists());
    let leftovers: Vec<_> = std::fs::read_dir(&dest)
        .unwrap()
        .filter_map(Result::ok)
        .collect();
    assert!(
        leftovers.is_empty(),
        "unexpected files after failed download: {leftovers:?}"
    );
}

#[tokio::test]
async fn test_successful_download_renames_temp_into_place() {
    let server = content_server::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("downloads");

    let page = "https://catalog.example/f/whole.bin";
    let provider = MockProvider::new().with_direct_url(page, server.file_url("whole.bin"));
    let engine = engine_over(provider);

    let bytes = engine.download(&item("whole.bin", page), &dest).await.unwrap();

    assert_eq!(bytes, content_server::PAYLOAD_LEN as u64);
    assert!(dest.join("whole.bin").exists());
    assert!(!dest.join("whole.bin.part").exists());
}

#[tokio::test]
async fn test_error_status_fails_before_writing() {
    let server = content_server::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("downloads");

    let page = "https://catalog.example/f/missing.bin";
    let provider = MockProvider::new()
        .with_direct_url(page, format!("http://{}/no-such-route", server.addr));
    let engine = engine_over(provider);

    let err = engine
        .download(&item("missing.bin", page), &dest)
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::Http { .. }));
    assert!(!dest.join("missing.bin").exists());
}
