//! Configurable provider for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use trawl_core::{ContentItem, ContentKind, TimeWindow};

use super::ListingProvider;
use crate::errors::FetchError;

/// Scripted provider for unit and integration tests.
///
/// Listings and link resolutions are seeded up front; unseeded lookups
/// fail the way the live site would. Fetch counts are recorded so tests
/// can assert how often the pipeline went back to the source.
#[derive(Debug, Default)]
pub struct MockProvider {
    listings: HashMap<ContentKind, Vec<ContentItem>>,
    direct_urls: HashMap<String, String>,
    fail_listings: bool,
    fetch_count: Mutex<usize>,
}

impl MockProvider {
    /// Creates an empty mock provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the listing returned for a kind.
    pub fn with_listing(mut self, kind: ContentKind, items: Vec<ContentItem>) -> Self {
        self.listings.insert(kind, items);
        self
    }

    /// Seeds a page-URL to direct-URL resolution.
    pub fn with_direct_url(
        mut self,
        page_url: impl Into<String>,
        direct_url: impl Into<String>,
    ) -> Self {
        self.direct_urls.insert(page_url.into(), direct_url.into());
        self
    }

    /// Makes every listing fetch fail.
    pub fn failing_listings(mut self) -> Self {
        self.fail_listings = true;
        self
    }

    /// Number of listing fetches served so far.
    pub fn fetch_count(&self) -> usize {
        *self.fetch_count.lock()
    }
}

#[async_trait]
impl ListingProvider for MockProvider {
    async fn fetch_listing(
        &self,
        kind: ContentKind,
        window: TimeWindow,
    ) -> Result<Vec<ContentItem>, FetchError> {
        *self.fetch_count.lock() += 1;

        if self.fail_listings {
            return Err(FetchError::ListingFailed {
                kind,
                window,
                reason: "mock failure".to_string(),
            });
        }

        Ok(self.listings.get(&kind).cloned().unwrap_or_default())
    }

    async fn resolve_direct_url(&self, page_url: &str) -> Result<String, FetchError> {
        self.direct_urls
            .get(page_url)
            .cloned()
            .ok_or_else(|| FetchError::NoDownloadLink {
                url: page_url.to_string(),
            })
    }
}
