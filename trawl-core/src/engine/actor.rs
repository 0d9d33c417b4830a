//! Actor implementation for the task engine.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::commands::TaskCommand;
use super::core::TaskEngine;
use super::handle::TaskEngineHandle;
use crate::config::ConfigHandle;
use crate::ledger::UsageLedger;
use crate::transfer::{TransferEngine, TransferError};

/// Spawns the task engine actor and returns its handle.
///
/// Creates a task engine over the provided configuration, transfer engine,
/// and download ledger, then spawns it as an actor running in a separate
/// task. The actor processes commands sequentially, so task snapshots are
/// never torn; batch workers run as their own tokio tasks and report back
/// through an internal event channel, keeping long transfers from blocking
/// status queries.
pub fn spawn_task_engine(
    config: ConfigHandle,
    transfer: Arc<TransferEngine>,
    download_ledger: Arc<UsageLedger>,
) -> TaskEngineHandle {
    let (sender, receiver) = mpsc::channel(100);
    let (event_sender, event_receiver) = mpsc::unbounded_channel();
    let engine = TaskEngine::new(config, transfer, download_ledger, event_sender);

    tokio::spawn(async move {
        run_actor_loop(engine, receiver, event_receiver).await;
    });

    TaskEngineHandle::new(sender)
}

/// Runs the main actor message processing loop.
///
/// Processes external commands and internal worker events one by one until
/// the command channel closes or a shutdown command arrives.
async fn run_actor_loop(
    mut engine: TaskEngine,
    mut receiver: mpsc::Receiver<TaskCommand>,
    mut event_receiver: mpsc::UnboundedReceiver<TaskCommand>,
) {
    tracing::debug!("Task engine actor started");

    loop {
        tokio::select! {
            Some(command) = receiver.recv() => {
                if !handle_command(&mut engine, command) {
                    break;
                }
            }
            Some(command) = event_receiver.recv() => {
                if !handle_command(&mut engine, command) {
                    break;
                }
            }
            else => break,
        }
    }

    tracing::debug!("Task engine actor stopped");
}

/// Handles a single command for the task engine.
/// Returns true to continue processing, false to shutdown.
fn handle_command(engine: &mut TaskEngine, command: TaskCommand) -> bool {
    match command {
        TaskCommand::SubmitBatch { items, responder } => {
            let id = engine.submit_batch(items);
            let _ = responder.send(id);
        }

        TaskCommand::GetTask { id, responder } => {
            let result = engine
                .task(id)
                .cloned()
                .ok_or(TransferError::TaskNotFound { id });
            let _ = responder.send(result);
        }

        TaskCommand::GetTasks { responder } => {
            let _ = responder.send(engine.all_tasks());
        }

        TaskCommand::CancelTask { id, responder } => {
            let _ = responder.send(engine.cancel(id));
        }

        TaskCommand::Shutdown { responder } => {
            let _ = responder.send(());
            return false;
        }

        TaskCommand::TaskStarted { id } => engine.apply_started(id),
        TaskCommand::TaskProgress { id, progress } => engine.apply_progress(id, progress),
        TaskCommand::ItemCompleted { id } => engine.apply_item_completed(id),
        TaskCommand::TaskFinished { id, summary } => engine.apply_finished(id, summary),
    }

    true
}
