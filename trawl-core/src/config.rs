//! Centralized configuration for Trawl.
//!
//! All tunable parameters and settings are defined here to avoid
//! hard-coded values scattered throughout the codebase. The configuration
//! is serializable because the web API exposes it for reading and partial
//! runtime updates.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::content::{ContentKind, TimeWindow};

/// Central configuration for all Trawl components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides and partial runtime updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrawlConfig {
    pub filter: FilterConfig,
    pub quota: QuotaConfig,
    pub storage: StorageConfig,
    pub network: NetworkConfig,
}

/// Size, kind, and recency predicates applied to listed items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Minimum item size in megabytes
    pub min_size_mb: f64,
    /// Maximum item size in megabytes (None = no upper bound)
    pub max_size_mb: Option<f64>,
    /// Content kinds to include in listings
    pub content_kinds: Vec<ContentKind>,
    /// Recency window for listings
    pub time_window: TimeWindow,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_size_mb: 0.0,
            max_size_mb: None,
            content_kinds: ContentKind::ALL.to_vec(),
            time_window: TimeWindow::Day,
        }
    }
}

/// Per-day data-volume quotas.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    /// Daily download ceiling in megabytes (None = unlimited)
    pub daily_download_limit_mb: Option<f64>,
    /// Daily upload ceiling in megabytes (None = unlimited)
    pub daily_upload_limit_mb: Option<f64>,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            daily_download_limit_mb: None,
            daily_upload_limit_mb: None,
        }
    }
}

/// File placement and persistence locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory downloaded files land in
    pub download_dir: PathBuf,
    /// Root of the typed content store for uploads
    pub upload_dir: PathBuf,
    /// Directory holding the persisted usage records
    pub state_dir: PathBuf,
    /// Suffix appended to in-flight download files
    pub temp_file_suffix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("downloads"),
            upload_dir: PathBuf::from("uploads"),
            state_dir: PathBuf::from("state"),
            temp_file_suffix: ".part".to_string(),
        }
    }
}

/// HTTP client configuration for catalog and transfer requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// User agent sent with catalog and download requests
    pub user_agent: String,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Base URL of the catalog site hosting content pages and direct links
    pub catalog_base_url: String,
    /// Base URL of the listings site serving per-kind top listings
    pub listings_base_url: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            user_agent: "trawl/0.1.0".to_string(),
            request_timeout_secs: 30,
            catalog_base_url: "https://catalog.example".to_string(),
            listings_base_url: "https://listings.catalog.example".to_string(),
        }
    }
}

/// Partial configuration update, applied through [`TrawlConfig::apply`].
///
/// Every field is optional; absent fields leave the current value in place.
/// Optional limits are double-wrapped so an explicit JSON `null` clears the
/// limit while an absent key leaves it alone. Mirrors the flat JSON body the
/// `POST /config` endpoint accepts.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigUpdate {
    pub min_size_mb: Option<f64>,
    #[serde(deserialize_with = "present_or_null")]
    pub max_size_mb: Option<Option<f64>>,
    pub content_kinds: Option<Vec<ContentKind>>,
    pub time_window: Option<TimeWindow>,
    #[serde(deserialize_with = "present_or_null")]
    pub daily_download_limit_mb: Option<Option<f64>>,
    #[serde(deserialize_with = "present_or_null")]
    pub daily_upload_limit_mb: Option<Option<f64>>,
    pub download_dir: Option<PathBuf>,
    pub upload_dir: Option<PathBuf>,
}

/// Deserializes a present key (including `null`) to `Some(...)`.
///
/// Combined with `#[serde(default)]`, an absent key stays `None`.
fn present_or_null<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// Errors produced when validating a configuration update.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid size range: min {min_mb} MB exceeds max {max_mb} MB")]
    InvalidSizeRange { min_mb: f64, max_mb: f64 },

    #[error("Negative value for {field}: {value}")]
    NegativeValue { field: &'static str, value: f64 },

    #[error("Empty path for {field}")]
    EmptyPath { field: &'static str },
}

impl TrawlConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Allows runtime configuration via environment variables while
    /// maintaining sensible defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("TRAWL_DOWNLOAD_DIR") {
            config.storage.download_dir = PathBuf::from(dir);
        }

        if let Ok(dir) = std::env::var("TRAWL_UPLOAD_DIR") {
            config.storage.upload_dir = PathBuf::from(dir);
        }

        if let Ok(dir) = std::env::var("TRAWL_STATE_DIR") {
            config.storage.state_dir = PathBuf::from(dir);
        }

        if let Ok(limit) = std::env::var("TRAWL_DAILY_DOWNLOAD_LIMIT_MB") {
            if let Ok(mb) = limit.parse::<f64>() {
                config.quota.daily_download_limit_mb = Some(mb);
            }
        }

        if let Ok(limit) = std::env::var("TRAWL_DAILY_UPLOAD_LIMIT_MB") {
            if let Ok(mb) = limit.parse::<f64>() {
                config.quota.daily_upload_limit_mb = Some(mb);
            }
        }

        if let Ok(timeout) = std::env::var("TRAWL_REQUEST_TIMEOUT") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                config.network.request_timeout_secs = seconds;
            }
        }

        if let Ok(base) = std::env::var("TRAWL_CATALOG_BASE") {
            config.network.catalog_base_url = base;
        }

        if let Ok(base) = std::env::var("TRAWL_LISTINGS_BASE") {
            config.network.listings_base_url = base;
        }

        config
    }

    /// Creates a configuration rooted under the given directory, for tests.
    pub fn for_testing(root: &std::path::Path) -> Self {
        Self {
            storage: StorageConfig {
                download_dir: root.join("downloads"),
                upload_dir: root.join("uploads"),
                state_dir: root.join("state"),
                temp_file_suffix: ".part".to_string(),
            },
            ..Default::default()
        }
    }

    /// Validates and merges a partial update into this configuration.
    ///
    /// Invalid values are rejected as a whole; the configuration is left
    /// untouched when any field fails validation.
    ///
    /// # Errors
    /// - `ConfigError::InvalidSizeRange` - Resulting min size exceeds max size
    /// - `ConfigError::NegativeValue` - Negative size or quota value
    /// - `ConfigError::EmptyPath` - Empty download or upload directory
    pub fn apply(&mut self, update: ConfigUpdate) -> Result<(), ConfigError> {
        let mut merged = self.clone();

        if let Some(min) = update.min_size_mb {
            merged.filter.min_size_mb = min;
        }
        if let Some(max) = update.max_size_mb {
            merged.filter.max_size_mb = max;
        }
        if let Some(kinds) = update.content_kinds {
            merged.filter.content_kinds = kinds;
        }
        if let Some(window) = update.time_window {
            merged.filter.time_window = window;
        }
        if let Some(limit) = update.daily_download_limit_mb {
            merged.quota.daily_download_limit_mb = limit;
        }
        if let Some(limit) = update.daily_upload_limit_mb {
            merged.quota.daily_upload_limit_mb = limit;
        }
        if let Some(dir) = update.download_dir {
            merged.storage.download_dir = dir;
        }
        if let Some(dir) = update.upload_dir {
            merged.storage.upload_dir = dir;
        }

        merged.validate()?;
        *self = merged;
        Ok(())
    }

    /// Checks the configuration for nonsensical values.
    ///
    /// # Errors
    /// - `ConfigError::InvalidSizeRange` - Min size exceeds max size
    /// - `ConfigError::NegativeValue` - Negative size or quota value
    /// - `ConfigError::EmptyPath` - Empty download or upload directory
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.filter.min_size_mb < 0.0 {
            return Err(ConfigError::NegativeValue {
                field: "min_size_mb",
                value: self.filter.min_size_mb,
            });
        }

        if let Some(max) = self.filter.max_size_mb {
            if max < 0.0 {
                return Err(ConfigError::NegativeValue {
                    field: "max_size_mb",
                    value: max,
                });
            }
            if self.filter.min_size_mb > max {
                return Err(ConfigError::InvalidSizeRange {
                    min_mb: self.filter.min_size_mb,
                    max_mb: max,
                });
            }
        }

        for (field, limit) in [
            ("daily_download_limit_mb", self.quota.daily_download_limit_mb),
            ("daily_upload_limit_mb", self.quota.daily_upload_limit_mb),
        ] {
            if let Some(value) = limit {
                if value < 0.0 {
                    return Err(ConfigError::NegativeValue { field, value });
                }
            }
        }

        if self.storage.download_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath {
                field: "download_dir",
            });
        }
        if self.storage.upload_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath { field: "upload_dir" });
        }

        Ok(())
    }
}

/// Shared, runtime-mutable configuration handle.
///
/// Cheap to clone; snapshots are taken per operation so a replacement never
/// retroactively re-validates in-flight transfers.
#[derive(Debug, Clone, Default)]
pub struct ConfigHandle {
    inner: Arc<RwLock<TrawlConfig>>,
}

impl ConfigHandle {
    /// Wraps a configuration in a shared handle.
    pub fn new(config: TrawlConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Returns a copy of the current configuration.
    pub fn snapshot(&self) -> TrawlConfig {
        self.inner.read().clone()
    }

    /// Validates and applies a partial update, returning the merged result.
    ///
    /// # Errors
    /// - `ConfigError` - The update contained invalid values; nothing changed
    pub fn update(&self, update: ConfigUpdate) -> Result<TrawlConfig, ConfigError> {
        let mut guard = self.inner.write();
        guard.apply(update)?;
        Ok(guard.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = TrawlConfig::default();

        assert_eq!(config.filter.min_size_mb, 0.0);
        assert_eq!(config.filter.max_size_mb, None);
        assert_eq!(config.filter.content_kinds.len(), 3);
        assert_eq!(config.filter.time_window, TimeWindow::Day);
        assert_eq!(config.quota.daily_download_limit_mb, None);
        assert_eq!(config.storage.temp_file_suffix, ".part");
        assert_eq!(config.network.request_timeout_secs, 30);
    }

    #[test]
    fn test_apply_merges_partial_update() {
        let mut config = TrawlConfig::default();

        let update = ConfigUpdate {
            min_size_mb: Some(5.0),
            max_size_mb: Some(Some(500.0)),
            daily_download_limit_mb: Some(Some(1000.0)),
            ..Default::default()
        };

        config.apply(update).unwrap();

        assert_eq!(config.filter.min_size_mb, 5.0);
        assert_eq!(config.filter.max_size_mb, Some(500.0));
        assert_eq!(config.quota.daily_download_limit_mb, Some(1000.0));
        // Untouched fields keep their defaults
        assert_eq!(config.quota.daily_upload_limit_mb, None);
    }

    #[test]
    fn test_apply_rejects_inverted_size_range() {
        let mut config = TrawlConfig::default();

        let update = ConfigUpdate {
            min_size_mb: Some(600.0),
            max_size_mb: Some(Some(500.0)),
            ..Default::default()
        };

        let err = config.apply(update).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSizeRange { .. }));
        // Rejected update leaves the configuration untouched
        assert_eq!(config.filter.min_size_mb, 0.0);
        assert_eq!(config.filter.max_size_mb, None);
    }

    #[test]
    fn test_apply_rejects_negative_quota() {
        let mut config = TrawlConfig::default();

        let update = ConfigUpdate {
            daily_upload_limit_mb: Some(Some(-1.0)),
            ..Default::default()
        };

        assert!(matches!(
            config.apply(update),
            Err(ConfigError::NegativeValue { .. })
        ));
    }

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let mut config = TrawlConfig::default();
        config.quota.daily_download_limit_mb = Some(100.0);
        config.quota.daily_upload_limit_mb = Some(200.0);

        // Explicit null clears the download limit; the absent upload key
        // leaves that limit alone.
        let update: ConfigUpdate =
            serde_json::from_str(r#"{"daily_download_limit_mb": null}"#).unwrap();
        config.apply(update).unwrap();

        assert_eq!(config.quota.daily_download_limit_mb, None);
        assert_eq!(config.quota.daily_upload_limit_mb, Some(200.0));
    }

    #[test]
    fn test_config_handle_snapshot_isolation() {
        let handle = ConfigHandle::new(TrawlConfig::default());
        let before = handle.snapshot();

        handle
            .update(ConfigUpdate {
                min_size_mb: Some(10.0),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(before.filter.min_size_mb, 0.0);
        assert_eq!(handle.snapshot().filter.min_size_mb, 10.0);
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = TrawlConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: TrawlConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.filter.min_size_mb, config.filter.min_size_mb);
        assert_eq!(back.storage.download_dir, config.storage.download_dir);
    }
}
