//! Trawl Core - Content acquisition pipeline fundamentals
//!
//! This crate provides the building blocks for catalog-driven content
//! acquisition: configuration, the shared content model, size filtering,
//! per-day usage quotas, the byte-transfer engine, the typed content store,
//! and the asynchronous task engine that orchestrates batch transfers.

pub mod config;
pub mod content;
pub mod engine;
pub mod filter;
pub mod ledger;
pub mod storage;
pub mod tracing_setup;
pub mod transfer;

// Re-export main types for convenient access
pub use config::{ConfigError, ConfigHandle, ConfigUpdate, TrawlConfig};
pub use content::{ContentItem, ContentKind, TimeWindow};
pub use engine::{TaskEngineHandle, TaskId, TaskStatus, TransferTask, spawn_task_engine};
pub use filter::ContentFilter;
pub use ledger::{Direction, UsageLedger, UsageRecord};
pub use storage::{ContentStore, StorageError, StoredFile};
pub use transfer::{LinkResolver, TransferEngine, TransferError};
