//! Trawl Web - JSON API Server

#![warn(missing_docs)]
#![warn(clippy::missing_errors_doc)]
#![warn(clippy::too_many_lines)]
//!
//! Pure JSON API server for the content acquisition pipeline. Provides
//! RESTful endpoints for configuration, catalog scraping, batch downloads,
//! uploads, and usage reporting.

pub mod error;
pub mod handlers;
pub mod server;

// Re-export main types
pub use error::ApiError;
pub use server::{AppState, build_state, router, run_server};
