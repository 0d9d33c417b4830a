//! Error types for catalog listing discovery.

use thiserror::Error;

use trawl_core::{ContentKind, TimeWindow};

/// Errors that can occur while fetching or parsing catalog listings.
#[derive(Debug, Error)]
pub enum FetchError {
    /// A per-kind listing fetch failed.
    #[error("Listing fetch failed for {kind} ({window}): {reason}")]
    ListingFailed {
        /// Content kind whose listing was requested
        kind: ContentKind,
        /// Recency window requested
        window: TimeWindow,
        /// The reason for the failure
        reason: String,
    },

    /// Network communication error.
    #[error("Network error: {reason}")]
    Network {
        /// The reason for the network error
        reason: String,
    },

    /// The site returned an error status.
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// Status code returned
        status: u16,
        /// URL that was requested
        url: String,
    },

    /// Unexpected markup; the expected structure was not found.
    #[error("Parse error: {reason}")]
    Parse {
        /// The reason for the parse error
        reason: String,
    },

    /// A catalog page carried no resolvable download link.
    #[error("No download link on {url}")]
    NoDownloadLink {
        /// The page URL that was inspected
        url: String,
    },

    /// A URL could not be constructed or joined.
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl {
        /// The offending URL text
        url: String,
        /// The reason it was rejected
        reason: String,
    },
}
