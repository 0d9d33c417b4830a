//! Command definitions for the task engine actor model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::content::ContentItem;
use crate::transfer::TransferError;

/// Opaque identifier for one batch-transfer task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Generates a fresh random task id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Lifecycle state of a transfer task.
///
/// `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl TaskStatus {
    /// Returns true for terminal states.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

/// Final outcome summary of a finished task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSummary {
    /// True when the batch ran to completion (individual items may still
    /// have failed); false for infrastructure faults and cancellation.
    pub success: bool,
    pub success_count: usize,
    pub failed_count: usize,
    pub message: String,
}

impl TaskSummary {
    /// Summary for a batch that ran to completion.
    pub fn completed(success_count: usize, total: usize) -> Self {
        Self {
            success: true,
            success_count,
            failed_count: total - success_count,
            message: format!("Downloaded {success_count} of {total} files"),
        }
    }

    /// Summary for a task that could not run to completion.
    pub fn failed(success_count: usize, total: usize, message: impl Into<String>) -> Self {
        Self {
            success: false,
            success_count,
            failed_count: total - success_count,
            message: message.into(),
        }
    }
}

/// One asynchronous batch-transfer job tracked by the engine.
///
/// Owned exclusively by the actor; workers report mutations through the
/// internal event channel, so snapshots handed to callers are always
/// internally consistent.
#[derive(Debug, Clone, Serialize)]
pub struct TransferTask {
    pub id: TaskId,
    pub status: TaskStatus,
    /// Items in submission order; processed strictly in this order.
    pub items: Vec<ContentItem>,
    pub completed_count: usize,
    pub total_count: usize,
    /// Fraction of items started, in `[0, 1]`. Monotonically non-decreasing;
    /// exactly 1.0 once the task completes.
    pub progress: f64,
    pub result: Option<TaskSummary>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl TransferTask {
    /// Creates a pending task for the given batch.
    pub fn new(id: TaskId, items: Vec<ContentItem>) -> Self {
        let total_count = items.len();
        Self {
            id,
            status: TaskStatus::Pending,
            items,
            completed_count: 0,
            total_count,
            progress: 0.0,
            result: None,
            created_at: chrono::Utc::now(),
        }
    }
}

/// Commands that can be sent to the task engine actor.
///
/// Each external command carries a response channel for the actor to send
/// back results. Worker tasks report progress through the responder-less
/// internal variants on a separate unbounded channel, keeping the actor the
/// single writer of the task registry.
pub enum TaskCommand {
    /// Submit a batch of items for background transfer.
    SubmitBatch {
        items: Vec<ContentItem>,
        responder: oneshot::Sender<TaskId>,
    },
    /// Get a snapshot of a specific task.
    GetTask {
        id: TaskId,
        responder: oneshot::Sender<Result<TransferTask, TransferError>>,
    },
    /// Get snapshots of all known tasks.
    GetTasks {
        responder: oneshot::Sender<Vec<TransferTask>>,
    },
    /// Request cooperative cancellation of a running task.
    CancelTask {
        id: TaskId,
        responder: oneshot::Sender<Result<(), TransferError>>,
    },
    /// Shutdown the engine actor gracefully.
    Shutdown { responder: oneshot::Sender<()> },
    /// Internal: a worker picked up its task.
    TaskStarted { id: TaskId },
    /// Internal: a worker is about to process the item at the given
    /// fraction through the batch.
    TaskProgress { id: TaskId, progress: f64 },
    /// Internal: a worker finished one item successfully.
    ItemCompleted { id: TaskId },
    /// Internal: a worker finished its batch.
    TaskFinished { id: TaskId, summary: TaskSummary },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_id_round_trips_through_display() {
        let id = TaskId::generate();
        let parsed: TaskId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_status_terminality() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
    }

    #[test]
    fn test_completed_summary_counts() {
        let summary = TaskSummary::completed(2, 3);
        assert!(summary.success);
        assert_eq!(summary.success_count, 2);
        assert_eq!(summary.failed_count, 1);
        assert_eq!(summary.message, "Downloaded 2 of 3 files");
    }

    #[test]
    fn test_new_task_is_pending_and_zeroed() {
        let task = TransferTask::new(TaskId::generate(), Vec::new());
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.completed_count, 0);
        assert_eq!(task.total_count, 0);
        assert_eq!(task.progress, 0.0);
        assert!(task.result.is_none());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&TaskStatus::Completed).unwrap(),
            "\"completed\""
        );
    }
}
