//! Shared content model for the acquisition pipeline.
//!
//! Catalog listings, transfer requests, and stored-file descriptors all
//! speak in terms of these types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Classification of a content item, used to select a storage subdirectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Video,
    Image,
    File,
}

impl ContentKind {
    /// All kinds, in the order listings are fetched and reported.
    pub const ALL: [ContentKind; 3] = [ContentKind::Video, ContentKind::Image, ContentKind::File];

    /// Returns the listing path segment for this kind ("videos", "images", "files").
    pub fn listing_segment(self) -> &'static str {
        match self {
            ContentKind::Video => "videos",
            ContentKind::Image => "images",
            ContentKind::File => "files",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.listing_segment())
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "video" | "videos" => Ok(ContentKind::Video),
            "image" | "images" => Ok(ContentKind::Image),
            "file" | "files" => Ok(ContentKind::File),
            _ => Err(format!("Invalid content kind: {s}")),
        }
    }
}

/// Recency window a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeWindow {
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "all")]
    All,
}

impl TimeWindow {
    /// Returns the query-parameter value the catalog site expects.
    pub fn as_query(self) -> &'static str {
        match self {
            TimeWindow::Day => "24h",
            TimeWindow::Week => "7d",
            TimeWindow::Month => "30d",
            TimeWindow::All => "all",
        }
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        TimeWindow::Day
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

impl FromStr for TimeWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "24h" => Ok(TimeWindow::Day),
            "7d" => Ok(TimeWindow::Week),
            "30d" => Ok(TimeWindow::Month),
            "all" => Ok(TimeWindow::All),
            _ => Err(format!("Invalid time window: {s}")),
        }
    }
}

/// One candidate item from a catalog listing.
///
/// Produced by a listing provider and immutable once created. Items are
/// unique per source URL within a single listing fetch; no deduplication
/// is performed across fetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    /// Display name, also used as the download file name.
    pub name: String,
    /// Parsed size in megabytes (0.0 when the size text was unparseable).
    pub size_mb: f64,
    /// Size text exactly as the listing showed it, e.g. "24.9 MB".
    pub size_text: String,
    /// URL of the item's catalog page. Direct transfer links are resolved
    /// from this page in a secondary fetch.
    pub source_url: String,
    /// Content classification.
    pub kind: ContentKind,
}
