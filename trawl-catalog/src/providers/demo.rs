//! Demo provider for development and testing.

use async_trait::async_trait;

use trawl_core::{ContentItem, ContentKind, TimeWindow};

use super::ListingProvider;
use crate::errors::FetchError;
use crate::size::parse_size_mb;

/// Demo provider returning realistic offline data.
///
/// Lets the web UI and CLI be exercised without hitting the catalog site.
/// Items cover a spread of sizes so size filters visibly change results.
#[derive(Debug, Default)]
pub struct DemoProvider;

impl DemoProvider {
    /// Creates a new demo provider.
    pub fn new() -> Self {
        Self
    }

    fn demo_entries(kind: ContentKind) -> &'static [(&'static str, &'static str)] {
        match kind {
            ContentKind::Video => &[
                ("sunset-timelapse.mp4", "24.9 MB"),
                ("city-drone-flight.mp4", "1.2 GB"),
                ("tutorial-episode-01.mp4", "350 MB"),
                ("clip-preview.mp4", "850 KB"),
            ],
            ContentKind::Image => &[
                ("wallpaper-4k.png", "8.1 MB"),
                ("scan-archive.tiff", "120 MB"),
                ("thumbnail.jpg", "96 KB"),
            ],
            ContentKind::File => &[
                ("dataset-2026.zip", "2.4 GB"),
                ("firmware-update.bin", "48 MB"),
                ("notes.txt", "12 KB"),
            ],
        }
    }
}

#[async_trait]
impl ListingProvider for DemoProvider {
    async fn fetch_listing(
        &self,
        kind: ContentKind,
        _window: TimeWindow,
    ) -> Result<Vec<ContentItem>, FetchError> {
        let items = Self::demo_entries(kind)
            .iter()
            .map(|(name, size_text)| ContentItem {
                name: (*name).to_string(),
                size_mb: parse_size_mb(size_text),
                size_text: (*size_text).to_string(),
                source_url: format!("https://demo.invalid/f/{name}"),
                kind,
            })
            .collect();

        Ok(items)
    }

    async fn resolve_direct_url(&self, page_url: &str) -> Result<String, FetchError> {
        // Demo pages have no real bytes behind them; hand back a stable
        // pseudo-link so the transfer path is at least reachable.
        Ok(format!("{page_url}/download"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_listings_are_deterministic() {
        let provider = DemoProvider::new();

        let first = provider
            .fetch_listing(ContentKind::Video, TimeWindow::Day)
            .await
            .unwrap();
        let second = provider
            .fetch_listing(ContentKind::Video, TimeWindow::All)
            .await
            .unwrap();

        assert_eq!(first.len(), second.len());
        assert_eq!(first[0].name, second[0].name);
        assert!(first.iter().all(|i| i.kind == ContentKind::Video));
    }

    #[tokio::test]
    async fn test_demo_sizes_parse() {
        let provider = DemoProvider::new();
        let files = provider
            .fetch_listing(ContentKind::File, TimeWindow::Day)
            .await
            .unwrap();

        let dataset = files.iter().find(|i| i.name == "dataset-2026.zip").unwrap();
        assert_eq!(dataset.size_mb, 2.4 * 1024.0);
    }
}
