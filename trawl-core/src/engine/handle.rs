//! Handle for communicating with the task engine actor.

use tokio::sync::{mpsc, oneshot};

use super::commands::{TaskCommand, TaskId, TransferTask};
use crate::content::ContentItem;
use crate::transfer::TransferError;

/// Handle for communicating with the task engine actor.
///
/// Provides an ergonomic async API for sending commands to the task engine
/// actor. It can be cloned and shared across threads safely.
#[derive(Clone)]
pub struct TaskEngineHandle {
    sender: mpsc::Sender<TaskCommand>,
}

impl TaskEngineHandle {
    /// Creates a new handle with the given command sender.
    pub fn new(sender: mpsc::Sender<TaskCommand>) -> Self {
        Self { sender }
    }

    /// Submits a batch of items for background transfer.
    ///
    /// The task is created in pending state and picked up by its worker
    /// immediately; poll [`Self::task`] for progress.
    ///
    /// # Errors
    /// - `TransferError::EngineShutdown` - Actor is no longer running
    pub async fn submit_batch(&self, items: Vec<ContentItem>) -> Result<TaskId, TransferError> {
        let (responder, rx) = oneshot::channel();
        let cmd = TaskCommand::SubmitBatch { items, responder };

        self.sender
            .send(cmd)
            .await
            .map_err(|_| TransferError::EngineShutdown)?;

        rx.await.map_err(|_| TransferError::EngineShutdown)
    }

    /// Gets a consistent snapshot of a specific task.
    ///
    /// # Errors
    /// - `TransferError::TaskNotFound` - Unknown task id
    /// - `TransferError::EngineShutdown` - Actor is no longer running
    pub async fn task(&self, id: TaskId) -> Result<TransferTask, TransferError> {
        let (responder, rx) = oneshot::channel();
        let cmd = TaskCommand::GetTask { id, responder };

        self.sender
            .send(cmd)
            .await
            .map_err(|_| TransferError::EngineShutdown)?;

        rx.await.map_err(|_| TransferError::EngineShutdown)?
    }

    /// Gets snapshots of all known tasks.
    ///
    /// # Errors
    /// - `TransferError::EngineShutdown` - Actor is no longer running
    pub async fn all_tasks(&self) -> Result<Vec<TransferTask>, TransferError> {
        let (responder, rx) = oneshot::channel();
        let cmd = TaskCommand::GetTasks { responder };

        self.sender
            .send(cmd)
            .await
            .map_err(|_| TransferError::EngineShutdown)?;

        rx.await.map_err(|_| TransferError::EngineShutdown)
    }

    /// Requests cooperative cancellation of a running task.
    ///
    /// The worker observes the request between items; items already in
    /// flight run to their own completion.
    ///
    /// # Errors
    /// - `TransferError::TaskNotFound` - Unknown task id
    /// - `TransferError::EngineShutdown` - Actor is no longer running
    pub async fn cancel_task(&self, id: TaskId) -> Result<(), TransferError> {
        let (responder, rx) = oneshot::channel();
        let cmd = TaskCommand::CancelTask { id, responder };

        self.sender
            .send(cmd)
            .await
            .map_err(|_| TransferError::EngineShutdown)?;

        rx.await.map_err(|_| TransferError::EngineShutdown)?
    }

    /// Shuts down the engine actor gracefully.
    ///
    /// After this call, all subsequent operations return
    /// `TransferError::EngineShutdown`. Running workers finish their
    /// batches but their final state is discarded with the actor.
    ///
    /// # Errors
    /// - `TransferError::EngineShutdown` - Actor already stopped
    pub async fn shutdown(&self) -> Result<(), TransferError> {
        let (responder, rx) = oneshot::channel();
        let cmd = TaskCommand::Shutdown { responder };

        self.sender
            .send(cmd)
            .await
            .map_err(|_| TransferError::EngineShutdown)?;

        rx.await.map_err(|_| TransferError::EngineShutdown)
    }

    /// Checks if the engine actor is still running.
    pub fn is_running(&self) -> bool {
        !self.sender.is_closed()
    }
}
