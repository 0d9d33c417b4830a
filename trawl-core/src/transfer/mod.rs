//! Byte transfer between the catalog site, the download area, and the
//! content store.

mod engine;

pub use engine::{LinkResolver, TransferEngine};

use std::path::PathBuf;

use crate::engine::TaskId;
use crate::ledger::QuotaExceeded;
use crate::storage::StorageError;

/// Errors that can occur during transfer and task operations.
///
/// Covers link resolution, quota refusal, stream failures, and task lookup.
/// Per-item errors are absorbed and counted by the task engine; they never
/// abort a batch.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("Failed to resolve direct link from {url}: {reason}")]
    LinkResolution { url: String, reason: String },

    #[error("{0}")]
    Quota(#[from] QuotaExceeded),

    #[error("Source file does not exist: {path}")]
    SourceMissing { path: PathBuf },

    #[error("HTTP transfer failed for {url}: {reason}")]
    Http { url: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Task {id} not found")]
    TaskNotFound { id: TaskId },

    #[error("Task engine is shut down")]
    EngineShutdown,
}
