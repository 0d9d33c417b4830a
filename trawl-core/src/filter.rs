//! Size-based acceptance policy for listed content items.

use crate::config::FilterConfig;
use crate::content::ContentItem;

/// Pure size predicate over candidate items.
///
/// Holds a snapshot of the filter configuration; each item is evaluated
/// independently with no cross-item state and no I/O.
#[derive(Debug, Clone)]
pub struct ContentFilter {
    min_size_mb: f64,
    max_size_mb: Option<f64>,
}

impl ContentFilter {
    /// Creates a filter from the given configuration section.
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            min_size_mb: config.min_size_mb,
            max_size_mb: config.max_size_mb,
        }
    }

    /// Returns true when the item's size falls within the configured bounds.
    ///
    /// Items below the minimum are rejected; items above the maximum are
    /// rejected only when a maximum is set. An unparseable size of 0.0
    /// passes any minimum of zero.
    pub fn accepts(&self, item: &ContentItem) -> bool {
        if item.size_mb < self.min_size_mb {
            return false;
        }

        if let Some(max) = self.max_size_mb {
            if item.size_mb > max {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentKind;

    fn item_of_size(size_mb: f64) -> ContentItem {
        ContentItem {
            name: "item.bin".to_string(),
            size_mb,
            size_text: format!("{size_mb} MB"),
            source_url: "https://catalog.example/f/item".to_string(),
            kind: ContentKind::File,
        }
    }

    fn filter(min: f64, max: Option<f64>) -> ContentFilter {
        ContentFilter::new(&FilterConfig {
            min_size_mb: min,
            max_size_mb: max,
            ..Default::default()
        })
    }

    #[test]
    fn test_rejects_below_minimum() {
        let filter = filter(5.0, None);
        assert!(!filter.accepts(&item_of_size(2.0)));
        assert!(filter.accepts(&item_of_size(5.0)));
        assert!(filter.accepts(&item_of_size(10.0)));
    }

    #[test]
    fn test_rejects_above_maximum_when_set() {
        let filter = filter(5.0, Some(500.0));
        assert!(filter.accepts(&item_of_size(10.0)));
        assert!(filter.accepts(&item_of_size(500.0)));
        assert!(!filter.accepts(&item_of_size(600.0)));
    }

    #[test]
    fn test_no_maximum_means_unbounded() {
        let filter = filter(0.0, None);
        assert!(filter.accepts(&item_of_size(1_000_000.0)));
    }

    #[test]
    fn test_zero_size_passes_zero_minimum() {
        // Unparseable sizes degrade to 0.0 and pass a minimum of zero.
        assert!(filter(0.0, Some(500.0)).accepts(&item_of_size(0.0)));
        assert!(!filter(5.0, None).accepts(&item_of_size(0.0)));
    }
}
