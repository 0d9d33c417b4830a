//! Integration tests for Trawl
//!
//! These tests verify the integration between different components of the
//! pipeline: catalog discovery, filtering, quota-gated transfer, the task
//! engine, and the HTTP surface over them.

#[path = "integration/content_server.rs"]
mod content_server;

#[path = "integration/acquisition_pipeline.rs"]
mod acquisition_pipeline;

#[path = "integration/download_cleanup.rs"]
mod download_cleanup;

#[path = "integration/quota_concurrency.rs"]
mod quota_concurrency;
