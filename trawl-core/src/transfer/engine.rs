//! Streamed download and local-copy transfer engine.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use super::TransferError;
use crate::config::NetworkConfig;
use crate::content::{ContentItem, ContentKind};
use crate::storage::{ContentStore, sanitize_file_name};

/// Resolves an item's catalog page to a direct transfer URL.
///
/// Catalog pages and direct file links differ; resolution is a secondary
/// fetch against the source site, performed by the catalog provider and
/// injected here so the transfer engine stays independent of markup
/// concerns.
#[async_trait]
pub trait LinkResolver: Send + Sync + std::fmt::Debug {
    /// Returns the direct transfer URL behind a catalog page.
    ///
    /// # Errors
    /// - `TransferError::LinkResolution` - Page fetch failed or carried no
    ///   download link
    async fn resolve_direct_url(&self, page_url: &str) -> Result<String, TransferError>;
}

/// Performs the actual byte transfers.
///
/// Downloads stream to a temp-suffixed path and are renamed into place on
/// success; a failed stream deletes its partial output so a truncated file
/// never sits at the final path. Uploads copy a local file into the content
/// store's kind-appropriate subdirectory. Quota checks belong to callers;
/// the engine only moves bytes.
#[derive(Debug)]
pub struct TransferEngine {
    client: reqwest::Client,
    resolver: std::sync::Arc<dyn LinkResolver>,
    temp_file_suffix: String,
}

impl TransferEngine {
    /// Creates an engine with the given network settings and link resolver.
    pub fn new(network: &NetworkConfig, resolver: std::sync::Arc<dyn LinkResolver>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(network.user_agent.clone())
            .timeout(Duration::from_secs(network.request_timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            resolver,
            temp_file_suffix: ".part".to_string(),
        }
    }

    /// Overrides the suffix appended to in-flight download files.
    pub fn with_temp_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.temp_file_suffix = suffix.into();
        self
    }

    /// Downloads an item into the destination directory.
    ///
    /// Resolves the direct URL first; resolution failure touches nothing on
    /// disk. Returns the number of bytes written.
    ///
    /// # Errors
    /// - `TransferError::LinkResolution` - No direct URL could be resolved
    /// - `TransferError::Http` - Request failed or returned an error status
    /// - `TransferError::Io` - Stream or filesystem failure (partial output
    ///   is removed before returning)
    pub async fn download(
        &self,
        item: &ContentItem,
        dest_dir: &Path,
    ) -> Result<u64, TransferError> {
        let direct_url = self.resolver.resolve_direct_url(&item.source_url).await?;

        let file_name = sanitize_file_name(&item.name);
        if file_name.is_empty() {
            return Err(TransferError::Storage(
                crate::storage::StorageError::InvalidFileName {
                    name: item.name.clone(),
                },
            ));
        }

        tokio::fs::create_dir_all(dest_dir).await?;
        let final_path = dest_dir.join(&file_name);
        let temp_path = dest_dir.join(format!("{file_name}{}", self.temp_file_suffix));

        match self.stream_to_file(&direct_url, &temp_path).await {
            Ok(bytes) => {
                if let Err(e) = tokio::fs::rename(&temp_path, &final_path).await {
                    remove_partial(&temp_path).await;
                    return Err(e.into());
                }
                tracing::info!(
                    name = %item.name,
                    bytes,
                    "Downloaded {} ({})",
                    item.name,
                    item.size_text
                );
                Ok(bytes)
            }
            Err(e) => {
                remove_partial(&temp_path).await;
                Err(e)
            }
        }
    }

    /// Copies a local file into the content store.
    ///
    /// Returns the number of bytes copied.
    ///
    /// # Errors
    /// - `TransferError::SourceMissing` - Source path does not exist
    /// - `TransferError::Storage` - Target could not be prepared
    /// - `TransferError::Io` - Copy failed
    pub async fn store_local(
        &self,
        source: &Path,
        kind: ContentKind,
        store: &ContentStore,
    ) -> Result<u64, TransferError> {
        if !tokio::fs::try_exists(source).await.unwrap_or(false) {
            return Err(TransferError::SourceMissing {
                path: source.to_path_buf(),
            });
        }

        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let target = store.prepare_target(&file_name, kind)?;

        let bytes = tokio::fs::copy(source, &target).await?;
        tracing::info!(
            source = %source.display(),
            target = %target.display(),
            bytes,
            "Stored local file"
        );
        Ok(bytes)
    }

    /// Streams an HTTP response body into a file, returning bytes written.
    async fn stream_to_file(&self, url: &str, path: &Path) -> Result<u64, TransferError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| TransferError::Http {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let mut file = File::create(path).await?;
        let mut stream = response.bytes_stream();
        let mut total: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| TransferError::Http {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
            total += chunk.len() as u64;
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        Ok(total)
    }
}

/// Best-effort removal of a partial download.
async fn remove_partial(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Failed to remove partial file {}: {e}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Resolver that always fails, for exercising the no-side-effects path.
    #[derive(Debug)]
    struct FailingResolver;

    #[async_trait]
    impl LinkResolver for FailingResolver {
        async fn resolve_direct_url(&self, page_url: &str) -> Result<String, TransferError> {
            Err(TransferError::LinkResolution {
                url: page_url.to_string(),
                reason: "no download link".to_string(),
            })
        }
    }

    fn engine_with_failing_resolver() -> TransferEngine {
        TransferEngine::new(&NetworkConfig::default(), Arc::new(FailingResolver))
    }

    fn sample_item() -> ContentItem {
        ContentItem {
            name: "clip.mp4".to_string(),
            size_mb: 10.0,
            size_text: "10 MB".to_string(),
            source_url: "https://catalog.example/f/clip".to_string(),
            kind: ContentKind::Video,
        }
    }

    #[tokio::test]
    async fn test_resolution_failure_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("downloads");
        let engine = engine_with_failing_resolver();

        let err = engine.download(&sample_item(), &dest).await.unwrap_err();
        assert!(matches!(err, TransferError::LinkResolution { .. }));
        // The destination directory is not even created
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_store_local_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path().join("uploads"));
        let engine = engine_with_failing_resolver();

        let missing = dir.path().join("nope.bin");
        let err = engine
            .store_local(&missing, ContentKind::File, &store)
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::SourceMissing { .. }));
    }

    #[tokio::test]
    async fn test_store_local_copies_into_typed_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("photo.jpg");
        tokio::fs::write(&source, b"image-bytes").await.unwrap();

        let store = ContentStore::new(dir.path().join("uploads"));
        let engine = engine_with_failing_resolver();

        let bytes = engine
            .store_local(&source, ContentKind::Image, &store)
            .await
            .unwrap();

        assert_eq!(bytes, 11);
        let target = dir.path().join("uploads/images/photo.jpg");
        assert_eq!(tokio::fs::read(&target).await.unwrap(), b"image-bytes");
        // Source is copied, not moved
        assert!(source.exists());
    }
}
