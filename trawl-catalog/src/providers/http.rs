//! HTTP provider scraping the live catalog site.

use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use trawl_core::config::NetworkConfig;
use trawl_core::{ContentItem, ContentKind, TimeWindow};

use super::ListingProvider;
use crate::errors::FetchError;
use crate::size::parse_size_mb;

/// Parses a selector known to be valid at compile time.
fn selector(source: &str) -> Selector {
    Selector::parse(source).expect("static selector")
}

/// Provider scraping the catalog's per-kind top listings.
///
/// Listings live at `{listings_base}/top{videos|images|files}?lapse={window}`.
/// Each listed item is an anchor carrying an `aria-label`, with sibling
/// markup holding the display name and size text. Direct transfer links are
/// resolved from the item's page in a secondary fetch.
#[derive(Debug)]
pub struct HttpCatalogProvider {
    client: reqwest::Client,
    catalog_base: Url,
    listings_base: Url,
}

impl HttpCatalogProvider {
    /// Creates a provider from the network configuration.
    ///
    /// # Errors
    /// - `FetchError::InvalidUrl` - A configured base URL does not parse
    pub fn new(network: &NetworkConfig) -> Result<Self, FetchError> {
        let catalog_base = parse_base(&network.catalog_base_url)?;
        let listings_base = parse_base(&network.listings_base_url)?;

        let client = reqwest::Client::builder()
            .user_agent(network.user_agent.clone())
            .timeout(Duration::from_secs(network.request_timeout_secs))
            .build()
            .map_err(|e| FetchError::Network {
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            catalog_base,
            listings_base,
        })
    }

    /// Fetches a URL and returns its body text.
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.text().await.map_err(|e| FetchError::Network {
            reason: e.to_string(),
        })
    }

    /// Extracts content items from a listing document.
    fn parse_listing(&self, html: &str, kind: ContentKind) -> Vec<ContentItem> {
        let document = Html::parse_document(html);
        let anchor_selector = selector("a[aria-label]");
        let cell_selector = selector("div");

        let mut items = Vec::new();

        for anchor in document.select(&anchor_selector) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };

            let Some(card) = anchor.parent().and_then(ElementRef::wrap) else {
                continue;
            };

            let mut name = None;
            let mut size_text = None;
            for cell in card.select(&cell_selector) {
                // Container divs collect all descendant text; only leaf
                // cells hold a single field.
                if !is_leaf(&cell) {
                    continue;
                }
                let text = element_text(&cell);
                if text.is_empty() {
                    continue;
                }
                if looks_like_size(&text) {
                    if size_text.is_none() {
                        size_text = Some(text);
                    }
                } else if name.is_none() && text.contains('.') {
                    name = Some(text);
                }
            }

            let (Some(name), Some(size_text)) = (name, size_text) else {
                continue;
            };

            let Some(source_url) = self.absolutize(&self.listings_base, href) else {
                continue;
            };

            items.push(ContentItem {
                size_mb: parse_size_mb(&size_text),
                name,
                size_text,
                source_url,
                kind,
            });
        }

        items
    }

    /// Joins a possibly-relative href against a base URL.
    fn absolutize(&self, base: &Url, href: &str) -> Option<String> {
        if href.starts_with("http") {
            return Some(href.to_string());
        }
        base.join(href).ok().map(|url| url.to_string())
    }
}

#[async_trait]
impl ListingProvider for HttpCatalogProvider {
    async fn fetch_listing(
        &self,
        kind: ContentKind,
        window: TimeWindow,
    ) -> Result<Vec<ContentItem>, FetchError> {
        let url = format!(
            "{}top{}?lapse={}",
            self.listings_base,
            kind.listing_segment(),
            window.as_query()
        );
        tracing::info!(%url, "Fetching {kind} listing");

        let html = self
            .fetch_text(&url)
            .await
            .map_err(|e| FetchError::ListingFailed {
                kind,
                window,
                reason: e.to_string(),
            })?;

        let items = self.parse_listing(&html, kind);
        tracing::info!("Found {} {kind} in listing", items.len());
        Ok(items)
    }

    async fn resolve_direct_url(&self, page_url: &str) -> Result<String, FetchError> {
        let html = self.fetch_text(page_url).await?;
        let document = Html::parse_document(&html);
        let anchor_selector = selector("a");

        for anchor in document.select(&anchor_selector) {
            if element_text(&anchor) != "Download" {
                continue;
            }
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            return self
                .absolutize(&self.catalog_base, href)
                .ok_or_else(|| FetchError::InvalidUrl {
                    url: href.to_string(),
                    reason: "could not join against catalog base".to_string(),
                });
        }

        Err(FetchError::NoDownloadLink {
            url: page_url.to_string(),
        })
    }
}

/// Collects and trims an element's text content.
fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Returns true when text carries a recognizable size unit.
fn looks_like_size(text: &str) -> bool {
    text.contains("KB") || text.contains("MB") || text.contains("GB")
}

/// Returns true when an element has no element children of its own.
fn is_leaf(element: &ElementRef<'_>) -> bool {
    !element
        .children()
        .any(|child| child.value().is_element())
}

fn parse_base(url: &str) -> Result<Url, FetchError> {
    // Ensure a trailing slash so Url::join treats the base as a directory.
    let normalized = if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    };

    Url::parse(&normalized).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> HttpCatalogProvider {
        HttpCatalogProvider::new(&NetworkConfig::default()).unwrap()
    }

    const LISTING_HTML: &str = r#"
        <html><body>
          <div class="grid">
            <div class="card">
              <a aria-label="watch" href="/f/abc123"></a>
              <div class="info">
                <div>sunset-timelapse.mp4</div>
                <div>24.9 MB</div>
              </div>
            </div>
            <div class="card">
              <a aria-label="watch" href="https://files.catalog.example/f/def456"></a>
              <div class="info">
                <div>mountains.mp4</div>
                <div>1.2 GB</div>
              </div>
            </div>
            <div class="card">
              <a aria-label="watch" href="/f/broken"></a>
              <div class="info"><div>no size here</div></div>
            </div>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_listing_extracts_items() {
        let items = provider().parse_listing(LISTING_HTML, ContentKind::Video);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "sunset-timelapse.mp4");
        assert_eq!(items[0].size_text, "24.9 MB");
        assert_eq!(items[0].size_mb, 24.9);
        assert_eq!(items[0].kind, ContentKind::Video);
        // Relative hrefs are joined against the listings base
        assert!(items[0].source_url.starts_with("https://"));
        assert!(items[0].source_url.ends_with("/f/abc123"));
        // Absolute hrefs pass through untouched
        assert_eq!(
            items[1].source_url,
            "https://files.catalog.example/f/def456"
        );
        assert_eq!(items[1].size_mb, 1.2 * 1024.0);
    }

    #[test]
    fn test_parse_listing_skips_incomplete_cards() {
        let items = provider().parse_listing(LISTING_HTML, ContentKind::Video);
        assert!(items.iter().all(|i| i.name != "no size here"));
    }

    #[test]
    fn test_parse_listing_on_empty_document() {
        let items = provider().parse_listing("<html></html>", ContentKind::File);
        assert!(items.is_empty());
    }
}
