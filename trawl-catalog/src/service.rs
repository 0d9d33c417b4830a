//! Catalog discovery service.
//!
//! Wraps a listing provider, applies the configured filter, and fans out
//! per-kind listings. Also implements link resolution for the transfer
//! engine, since direct links come from the same site client.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use trawl_core::config::TrawlConfig;
use trawl_core::transfer::TransferError;
use trawl_core::{ContentFilter, ContentItem, ContentKind, LinkResolver, TimeWindow};

use crate::errors::FetchError;
use crate::providers::{DemoProvider, HttpCatalogProvider, ListingProvider};

/// Filtered listings for every content kind, as served by `GET /scrape`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Listing {
    pub videos: Vec<ContentItem>,
    pub images: Vec<ContentItem>,
    pub files: Vec<ContentItem>,
}

impl Listing {
    fn slot(&mut self, kind: ContentKind) -> &mut Vec<ContentItem> {
        match kind {
            ContentKind::Video => &mut self.videos,
            ContentKind::Image => &mut self.images,
            ContentKind::File => &mut self.files,
        }
    }
}

/// Catalog discovery service over a pluggable listing provider.
#[derive(Debug, Clone)]
pub struct CatalogService {
    provider: Arc<dyn ListingProvider>,
}

impl CatalogService {
    /// Creates a service scraping the live catalog site.
    ///
    /// # Errors
    /// - `FetchError::InvalidUrl` - A configured base URL does not parse
    /// - `FetchError::Network` - HTTP client could not be constructed
    pub fn new(config: &TrawlConfig) -> Result<Self, FetchError> {
        Ok(Self {
            provider: Arc::new(HttpCatalogProvider::new(&config.network)?),
        })
    }

    /// Creates a service with deterministic offline demo data.
    pub fn new_demo() -> Self {
        Self {
            provider: Arc::new(DemoProvider::new()),
        }
    }

    /// Creates a service over an arbitrary provider.
    pub fn with_provider(provider: Arc<dyn ListingProvider>) -> Self {
        Self { provider }
    }

    /// Fetches the unfiltered listing for one kind and window.
    ///
    /// # Errors
    /// - `FetchError::ListingFailed` - Listing could not be fetched or parsed
    pub async fn listing(
        &self,
        kind: ContentKind,
        window: TimeWindow,
    ) -> Result<Vec<ContentItem>, FetchError> {
        self.provider.fetch_listing(kind, window).await
    }

    /// Fetches all configured listings and applies the size filter.
    ///
    /// Kinds excluded by the configuration come back empty, as does any
    /// kind whose fetch fails: listing failures are logged and degrade to
    /// an empty list rather than failing the scrape.
    pub async fn scrape(&self, config: &TrawlConfig) -> Listing {
        let filter = ContentFilter::new(&config.filter);
        let window = config.filter.time_window;
        let mut listing = Listing::default();

        for kind in ContentKind::ALL {
            if !config.filter.content_kinds.contains(&kind) {
                continue;
            }

            match self.listing(kind, window).await {
                Ok(items) => {
                    let accepted: Vec<ContentItem> = items
                        .into_iter()
                        .filter(|item| filter.accepts(item))
                        .collect();
                    tracing::info!(
                        "Listing {kind}: {} items matched the filter",
                        accepted.len()
                    );
                    *listing.slot(kind) = accepted;
                }
                Err(e) => {
                    tracing::warn!("Skipping {kind} listing: {e}");
                }
            }
        }

        listing
    }
}

#[async_trait]
impl LinkResolver for CatalogService {
    async fn resolve_direct_url(&self, page_url: &str) -> Result<String, TransferError> {
        self.provider
            .resolve_direct_url(page_url)
            .await
            .map_err(|e| TransferError::LinkResolution {
                url: page_url.to_string(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MockProvider;

    fn item(name: &str, size_mb: f64, kind: ContentKind) -> ContentItem {
        ContentItem {
            name: name.to_string(),
            size_mb,
            size_text: format!("{size_mb} MB"),
            source_url: format!("https://catalog.example/f/{name}"),
            kind,
        }
    }

    #[tokio::test]
    async fn test_scrape_applies_size_filter() {
        let provider = MockProvider::new().with_listing(
            ContentKind::Video,
            vec![
                item("small.mp4", 2.0, ContentKind::Video),
                item("medium.mp4", 10.0, ContentKind::Video),
                item("huge.mp4", 600.0, ContentKind::Video),
            ],
        );
        let service = CatalogService::with_provider(Arc::new(provider));

        let mut config = TrawlConfig::default();
        config.filter.min_size_mb = 5.0;
        config.filter.max_size_mb = Some(500.0);

        let listing = service.scrape(&config).await;

        assert_eq!(listing.videos.len(), 1);
        assert_eq!(listing.videos[0].name, "medium.mp4");
        assert!(listing.images.is_empty());
        assert!(listing.files.is_empty());
    }

    #[tokio::test]
    async fn test_scrape_honors_content_kinds() {
        let provider = Arc::new(
            MockProvider::new()
                .with_listing(
                    ContentKind::Video,
                    vec![item("a.mp4", 10.0, ContentKind::Video)],
                )
                .with_listing(
                    ContentKind::Image,
                    vec![item("b.jpg", 10.0, ContentKind::Image)],
                ),
        );
        let service = CatalogService::with_provider(provider.clone());

        let mut config = TrawlConfig::default();
        config.filter.content_kinds = vec![ContentKind::Image];

        let listing = service.scrape(&config).await;

        assert!(listing.videos.is_empty());
        assert_eq!(listing.images.len(), 1);
        // Excluded kinds are never fetched at all
        assert_eq!(provider.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_scrape_degrades_failed_listings_to_empty() {
        let provider = MockProvider::new().failing_listings();
        let service = CatalogService::with_provider(Arc::new(provider));

        let listing = service.scrape(&TrawlConfig::default()).await;

        assert!(listing.videos.is_empty());
        assert!(listing.images.is_empty());
        assert!(listing.files.is_empty());
    }

    #[tokio::test]
    async fn test_resolver_maps_fetch_errors() {
        let service = CatalogService::with_provider(Arc::new(MockProvider::new()));

        let err = service
            .resolve_direct_url("https://catalog.example/f/unknown")
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::LinkResolution { .. }));
    }
}
