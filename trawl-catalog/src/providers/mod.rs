//! Listing providers for catalog discovery.

mod demo;
mod http;
mod mock;

use async_trait::async_trait;

use trawl_core::{ContentItem, ContentKind, TimeWindow};

use crate::errors::FetchError;

pub use demo::DemoProvider;
pub use http::HttpCatalogProvider;
pub use mock::MockProvider;

/// Trait for catalog listing providers.
///
/// A provider turns remote catalog state into structured [`ContentItem`]s
/// and resolves item pages to direct transfer URLs. The rest of the
/// pipeline consumes only this contract and never touches markup.
#[async_trait]
pub trait ListingProvider: Send + Sync + std::fmt::Debug {
    /// Fetches the listing for one content kind and recency window.
    ///
    /// # Errors
    /// - `FetchError::ListingFailed` - Listing could not be fetched or parsed
    async fn fetch_listing(
        &self,
        kind: ContentKind,
        window: TimeWindow,
    ) -> Result<Vec<ContentItem>, FetchError>;

    /// Resolves an item's catalog page to its direct transfer URL.
    ///
    /// # Errors
    /// - `FetchError::NoDownloadLink` - Page carried no download link
    /// - `FetchError::Network` - Page could not be fetched
    async fn resolve_direct_url(&self, page_url: &str) -> Result<String, FetchError>;
}
