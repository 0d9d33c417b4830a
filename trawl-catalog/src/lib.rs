//! Trawl Catalog - Listing discovery

#![warn(missing_docs)]
#![warn(clippy::missing_errors_doc)]
#![warn(clippy::too_many_lines)]
//!
//! Fetches and parses catalog listings into structured content items,
//! behind a provider trait so the HTTP scraper, offline demo data, and
//! scripted test providers are interchangeable. Also resolves item pages
//! to direct transfer URLs for the transfer engine.

pub mod errors;
pub mod providers;
pub mod service;
pub mod size;

// Re-export main types
pub use errors::FetchError;
pub use providers::{DemoProvider, HttpCatalogProvider, ListingProvider, MockProvider};
pub use service::{CatalogService, Listing};
pub use size::parse_size_mb;

/// Convenience type alias for Results with FetchError.
pub type Result<T> = std::result::Result<T, FetchError>;
