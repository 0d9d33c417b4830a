//! Asynchronous batch-transfer task engine.
//!
//! Actor-model engine owning the registry of transfer tasks. External
//! callers talk to it through [`TaskEngineHandle`]; batch workers run as
//! detached tokio tasks and report progress through an internal event
//! channel, so the actor remains the single writer of task state and
//! status queries always observe consistent snapshots.

mod actor;
mod commands;
mod core;
mod handle;
mod worker;

#[cfg(test)]
mod integration_tests;

pub use actor::spawn_task_engine;
pub use commands::{TaskCommand, TaskId, TaskStatus, TaskSummary, TransferTask};
pub use handle::TaskEngineHandle;
