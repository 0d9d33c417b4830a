//! Batch worker executing one submitted task.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;

use super::commands::{TaskCommand, TaskId, TaskSummary};
use crate::config::TrawlConfig;
use crate::content::ContentItem;
use crate::ledger::{Direction, UsageLedger};
use crate::transfer::{TransferEngine, TransferError};

/// Everything a batch worker needs, captured at submission time.
pub(super) struct BatchContext {
    pub id: TaskId,
    pub items: Vec<ContentItem>,
    /// Config snapshot; later updates do not affect this batch.
    pub config: TrawlConfig,
    pub transfer: Arc<TransferEngine>,
    pub ledger: Arc<UsageLedger>,
    pub cancel: Arc<AtomicBool>,
    pub events: mpsc::UnboundedSender<TaskCommand>,
}

/// Runs one batch to completion, reporting through the event channel.
///
/// Items are processed strictly in submission order. Per-item failures are
/// logged and counted but never abort the batch; only a fault in the task
/// infrastructure itself (an unusable download directory) fails the task
/// as a whole.
pub(super) async fn run_batch(ctx: BatchContext) {
    let id = ctx.id;
    let total = ctx.items.len();
    let _ = ctx.events.send(TaskCommand::TaskStarted { id });

    // Infrastructure check: without a writable download directory the whole
    // task is doomed, not any individual item.
    if let Err(e) = tokio::fs::create_dir_all(&ctx.config.storage.download_dir).await {
        tracing::error!(task_id = %id, "Task infrastructure fault: {e}");
        let summary = TaskSummary::failed(0, total, format!("Download directory unusable: {e}"));
        let _ = ctx.events.send(TaskCommand::TaskFinished { id, summary });
        return;
    }

    let mut success_count = 0usize;

    for (index, item) in ctx.items.iter().enumerate() {
        if ctx.cancel.load(Ordering::Relaxed) {
            tracing::info!(task_id = %id, "Task cancelled after {index} of {total} items");
            let summary = TaskSummary::failed(
                success_count,
                total,
                format!("Task cancelled after {index} of {total} items"),
            );
            let _ = ctx.events.send(TaskCommand::TaskFinished { id, summary });
            return;
        }

        // Progress counts items started, so it is slightly optimistic and
        // monotonically non-decreasing.
        let progress = index as f64 / total as f64;
        let _ = ctx.events.send(TaskCommand::TaskProgress { id, progress });

        match transfer_item(&ctx, item).await {
            Ok(bytes) => {
                success_count += 1;
                tracing::debug!(task_id = %id, name = %item.name, bytes, "Item transferred");
                let _ = ctx.events.send(TaskCommand::ItemCompleted { id });
            }
            Err(e) => {
                tracing::warn!(task_id = %id, name = %item.name, "Item failed: {e}");
            }
        }
    }

    let summary = TaskSummary::completed(success_count, total);
    let _ = ctx.events.send(TaskCommand::TaskFinished { id, summary });
}

/// Transfers a single item, gated by the download quota.
///
/// Capacity is reserved atomically before any I/O; a failed transfer hands
/// its reservation back so refused bytes are never counted.
async fn transfer_item(ctx: &BatchContext, item: &ContentItem) -> Result<u64, TransferError> {
    let reservation = ctx.ledger.try_reserve(
        Direction::Download,
        item.size_mb,
        ctx.config.quota.daily_download_limit_mb,
    )?;

    match ctx
        .transfer
        .download(item, &ctx.config.storage.download_dir)
        .await
    {
        Ok(bytes) => Ok(bytes),
        Err(e) => {
            ctx.ledger.release(reservation);
            Err(e)
        }
    }
}
