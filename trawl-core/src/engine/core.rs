//! Core task engine implementation for the actor model.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;

use super::commands::{TaskCommand, TaskId, TaskStatus, TaskSummary, TransferTask};
use super::worker::{self, BatchContext};
use crate::config::ConfigHandle;
use crate::content::ContentItem;
use crate::ledger::UsageLedger;
use crate::transfer::{TransferEngine, TransferError};

/// Core task engine implementation.
///
/// This is the private implementation that runs inside the actor. It owns
/// the task registry and is the only writer of task state; batch workers
/// run as detached tokio tasks and feed mutations back through the internal
/// event channel. Tasks are never evicted; they live for the process
/// lifetime.
pub struct TaskEngine {
    /// Runtime-mutable configuration; snapshotted per submitted batch
    config: ConfigHandle,
    /// Transfer engine shared with every worker
    transfer: Arc<TransferEngine>,
    /// Download quota ledger shared with every worker
    download_ledger: Arc<UsageLedger>,
    /// All tasks ever submitted, by id
    tasks: HashMap<TaskId, TransferTask>,
    /// Cooperative cancellation flags for non-terminal tasks
    cancel_flags: HashMap<TaskId, Arc<AtomicBool>>,
    /// Channel workers report progress through
    event_sender: mpsc::UnboundedSender<TaskCommand>,
}

impl TaskEngine {
    /// Creates a new task engine.
    pub fn new(
        config: ConfigHandle,
        transfer: Arc<TransferEngine>,
        download_ledger: Arc<UsageLedger>,
        event_sender: mpsc::UnboundedSender<TaskCommand>,
    ) -> Self {
        Self {
            config,
            transfer,
            download_ledger,
            tasks: HashMap::new(),
            cancel_flags: HashMap::new(),
            event_sender,
        }
    }

    /// Registers a batch and spawns its worker.
    ///
    /// The task starts in `Pending` and the worker flips it to `Running`
    /// through the event channel. Configuration is snapshotted here so
    /// later updates never re-validate an in-flight batch.
    pub fn submit_batch(&mut self, items: Vec<ContentItem>) -> TaskId {
        let id = TaskId::generate();
        let task = TransferTask::new(id, items.clone());
        let total = task.total_count;
        self.tasks.insert(id, task);

        let cancel = Arc::new(AtomicBool::new(false));
        self.cancel_flags.insert(id, cancel.clone());

        let context = BatchContext {
            id,
            items,
            config: self.config.snapshot(),
            transfer: self.transfer.clone(),
            ledger: self.download_ledger.clone(),
            cancel,
            events: self.event_sender.clone(),
        };

        tokio::spawn(worker::run_batch(context));

        tracing::info!(task_id = %id, total, "Submitted download batch");
        id
    }

    /// Returns a snapshot of the task with the given id.
    pub fn task(&self, id: TaskId) -> Option<&TransferTask> {
        self.tasks.get(&id)
    }

    /// Returns snapshots of every known task.
    pub fn all_tasks(&self) -> Vec<TransferTask> {
        self.tasks.values().cloned().collect()
    }

    /// Flags a task for cooperative cancellation.
    ///
    /// The worker observes the flag between items. Cancelling a task that
    /// already reached a terminal state is a no-op.
    ///
    /// # Errors
    /// - `TransferError::TaskNotFound` - Unknown task id
    pub fn cancel(&mut self, id: TaskId) -> Result<(), TransferError> {
        if !self.tasks.contains_key(&id) {
            return Err(TransferError::TaskNotFound { id });
        }

        if let Some(flag) = self.cancel_flags.get(&id) {
            flag.store(true, Ordering::Relaxed);
            tracing::info!(task_id = %id, "Cancellation requested");
        }
        Ok(())
    }

    /// Marks a task as picked up by its worker.
    pub fn apply_started(&mut self, id: TaskId) {
        if let Some(task) = self.tasks.get_mut(&id) {
            task.status = TaskStatus::Running;
        }
    }

    /// Records forward progress on a running task.
    pub fn apply_progress(&mut self, id: TaskId, progress: f64) {
        if let Some(task) = self.tasks.get_mut(&id) {
            // Progress reflects items started and never moves backwards.
            if progress > task.progress {
                task.progress = progress;
            }
        }
    }

    /// Records one successfully transferred item.
    pub fn apply_item_completed(&mut self, id: TaskId) {
        if let Some(task) = self.tasks.get_mut(&id) {
            task.completed_count += 1;
        }
    }

    /// Finalizes a task with its outcome summary.
    pub fn apply_finished(&mut self, id: TaskId, summary: TaskSummary) {
        if let Some(task) = self.tasks.get_mut(&id) {
            if summary.success {
                task.status = TaskStatus::Completed;
                task.progress = 1.0;
            } else {
                task.status = TaskStatus::Failed;
            }
            task.completed_count = summary.success_count;
            task.result = Some(summary);
        }
        self.cancel_flags.remove(&id);
    }
}
