//! In-process integration tests for the task engine actor.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::*;
use crate::config::{ConfigHandle, TrawlConfig};
use crate::content::{ContentItem, ContentKind};
use crate::ledger::{InMemoryStore, UsageLedger};
use crate::transfer::{LinkResolver, TransferEngine, TransferError};

/// Resolver that fails every resolution, optionally after a delay.
#[derive(Debug)]
struct FailingResolver {
    delay: Duration,
}

#[async_trait]
impl LinkResolver for FailingResolver {
    async fn resolve_direct_url(&self, page_url: &str) -> Result<String, TransferError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Err(TransferError::LinkResolution {
            url: page_url.to_string(),
            reason: "no download link".to_string(),
        })
    }
}

fn test_items(count: usize) -> Vec<ContentItem> {
    (0..count)
        .map(|i| ContentItem {
            name: format!("item-{i}.bin"),
            size_mb: 10.0,
            size_text: "10 MB".to_string(),
            source_url: format!("https://catalog.example/f/{i}"),
            kind: ContentKind::File,
        })
        .collect()
}

fn spawn_test_engine(
    config: TrawlConfig,
    resolver_delay: Duration,
) -> (TaskEngineHandle, Arc<UsageLedger>) {
    let config = ConfigHandle::new(config);
    let ledger = Arc::new(UsageLedger::open(Box::new(InMemoryStore::new())));
    let transfer = Arc::new(TransferEngine::new(
        &config.snapshot().network,
        Arc::new(FailingResolver {
            delay: resolver_delay,
        }),
    ));

    let handle = spawn_task_engine(config, transfer, ledger.clone());
    (handle, ledger)
}

async fn wait_for_terminal(handle: &TaskEngineHandle, id: TaskId) -> TransferTask {
    for _ in 0..500 {
        let task = handle.task(id).await.unwrap();
        if task.status.is_terminal() {
            return task;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("task {id} never reached a terminal state");
}

#[tokio::test]
async fn test_batch_with_all_failures_still_completes() {
    let dir = tempfile::tempdir().unwrap();
    let (handle, _ledger) =
        spawn_test_engine(TrawlConfig::for_testing(dir.path()), Duration::ZERO);

    let id = handle.submit_batch(test_items(3)).await.unwrap();
    let task = wait_for_terminal(&handle, id).await;

    // Item failures never fail the batch; they are counted instead.
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.progress, 1.0);
    let summary = task.result.unwrap();
    assert!(summary.success);
    assert_eq!(summary.success_count, 0);
    assert_eq!(summary.failed_count, 3);
}

#[tokio::test]
async fn test_progress_is_monotonic() {
    let dir = tempfile::tempdir().unwrap();
    let (handle, _ledger) = spawn_test_engine(
        TrawlConfig::for_testing(dir.path()),
        Duration::from_millis(20),
    );

    let id = handle.submit_batch(test_items(5)).await.unwrap();

    let mut last = 0.0f64;
    loop {
        let task = handle.task(id).await.unwrap();
        assert!(
            task.progress >= last,
            "progress went backwards: {last} -> {}",
            task.progress
        );
        last = task.progress;
        if task.status.is_terminal() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    assert_eq!(last, 1.0);
}

#[tokio::test]
async fn test_quota_refusal_counts_as_item_failure() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = TrawlConfig::for_testing(dir.path());
    config.quota.daily_download_limit_mb = Some(15.0);

    let (handle, ledger) = spawn_test_engine(config, Duration::ZERO);

    // Each item claims 10 MB against a 15 MB limit: the first reservation
    // would succeed if the transfer did, but resolution fails and releases
    // it, so every item is refused-or-failed and the ledger ends at zero.
    let id = handle.submit_batch(test_items(3)).await.unwrap();
    let task = wait_for_terminal(&handle, id).await;

    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.result.unwrap().failed_count, 3);
    assert_eq!(ledger.current_record().downloaded_mb, 0.0);
}

#[tokio::test]
async fn test_unknown_task_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let (handle, _ledger) =
        spawn_test_engine(TrawlConfig::for_testing(dir.path()), Duration::ZERO);

    let err = handle.task(TaskId::generate()).await.unwrap_err();
    assert!(matches!(err, TransferError::TaskNotFound { .. }));
}

#[tokio::test]
async fn test_cancellation_between_items() {
    let dir = tempfile::tempdir().unwrap();
    let (handle, _ledger) = spawn_test_engine(
        TrawlConfig::for_testing(dir.path()),
        Duration::from_millis(100),
    );

    let id = handle.submit_batch(test_items(10)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    handle.cancel_task(id).await.unwrap();

    let task = wait_for_terminal(&handle, id).await;
    assert_eq!(task.status, TaskStatus::Failed);
    let summary = task.result.unwrap();
    assert!(!summary.success);
    assert!(summary.message.contains("cancelled"));
    // The worker stopped early; most items never started.
    assert!(summary.failed_count > 0);
}

#[tokio::test]
async fn test_cancel_unknown_task_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let (handle, _ledger) =
        spawn_test_engine(TrawlConfig::for_testing(dir.path()), Duration::ZERO);

    let err = handle.cancel_task(TaskId::generate()).await.unwrap_err();
    assert!(matches!(err, TransferError::TaskNotFound { .. }));
}

#[tokio::test]
async fn test_shutdown_stops_the_actor() {
    let dir = tempfile::tempdir().unwrap();
    let (handle, _ledger) =
        spawn_test_engine(TrawlConfig::for_testing(dir.path()), Duration::ZERO);

    handle.shutdown().await.unwrap();

    // Give the actor a moment to drop its receiver.
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!handle.is_running());
    let err = handle.submit_batch(test_items(1)).await.unwrap_err();
    assert!(matches!(err, TransferError::EngineShutdown));
}
