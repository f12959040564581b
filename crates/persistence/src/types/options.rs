//! Bulk-read options.

use serde::{Deserialize, Serialize};

/// Options accompanying a bulk read.
///
/// `passthrough` carries every query parameter the caller sent that the
/// gateway does not interpret itself (`limit`, `skip`, `descending`,
/// `conflicts`, ...), in the order received. Backends read the paging
/// parameters from it; repeated parameters resolve to the last occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchOptions {
    /// Whether document bodies are included in the rows.
    pub include_docs: bool,

    /// Unprocessed parameters, forwarded verbatim.
    pub passthrough: Vec<(String, String)>,
}

impl FetchOptions {
    /// Creates options with the given body flag and no pass-through parameters.
    pub fn new(include_docs: bool) -> Self {
        Self {
            include_docs,
            passthrough: Vec::new(),
        }
    }

    /// Adds a pass-through parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.passthrough.push((name.into(), value.into()));
        self
    }

    /// Returns the last value supplied for `name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.passthrough
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// The `limit` parameter, if present and numeric.
    pub fn limit(&self) -> Option<usize> {
        self.param("limit").and_then(|v| v.parse().ok())
    }

    /// The `skip` parameter, defaulting to 0.
    pub fn skip(&self) -> usize {
        self.param("skip").and_then(|v| v.parse().ok()).unwrap_or(0)
    }

    /// The `descending` parameter.
    pub fn descending(&self) -> bool {
        self.param("descending") == Some("true")
    }

    /// Returns these options with `skip` and `limit` removed, for reads whose
    /// rows are windowed by the caller after further filtering.
    pub fn without_paging(&self) -> Self {
        Self {
            include_docs: self.include_docs,
            passthrough: self
                .passthrough
                .iter()
                .filter(|(key, _)| key != "skip" && key != "limit")
                .cloned()
                .collect(),
        }
    }

    /// Applies `skip` and `limit` to an ordered row sequence.
    pub fn window<T>(&self, rows: impl IntoIterator<Item = T>) -> Vec<T> {
        let rows = rows.into_iter().skip(self.skip());
        match self.limit() {
            Some(limit) => rows.take(limit).collect(),
            None => rows.collect(),
        }
    }
}

/// Which documents a store read selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySelector {
    /// An explicit, ordered list of document ids.
    Keys(Vec<String>),
    /// A contiguous id range.
    Range(KeyRange),
}

/// An id range over the store's bytewise id order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    /// Start bound, always inclusive.
    pub start: Option<String>,
    /// End bound.
    pub end: Option<String>,
    /// Whether the end bound is inclusive.
    pub inclusive_end: bool,
}

impl Default for KeyRange {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            inclusive_end: true,
        }
    }
}

impl KeyRange {
    /// Returns `true` if `id` falls inside the range.
    ///
    /// When reading in descending order the start bound is the upper bound
    /// and the end bound the lower one.
    pub fn contains(&self, id: &str, descending: bool) -> bool {
        let after_start = match &self.start {
            Some(start) if descending => id <= start.as_str(),
            Some(start) => id >= start.as_str(),
            None => true,
        };

        let before_end = match &self.end {
            Some(end) => match (descending, self.inclusive_end) {
                (false, true) => id <= end.as_str(),
                (false, false) => id < end.as_str(),
                (true, true) => id >= end.as_str(),
                (true, false) => id > end.as_str(),
            },
            None => true,
        };

        after_start && before_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paging_params_last_wins() {
        let options = FetchOptions::new(false)
            .with_param("limit", "5")
            .with_param("skip", "1")
            .with_param("limit", "2");
        assert_eq!(options.limit(), Some(2));
        assert_eq!(options.skip(), 1);
        assert!(!options.descending());
    }

    #[test]
    fn test_window() {
        let options = FetchOptions::new(false)
            .with_param("skip", "1")
            .with_param("limit", "2");
        assert_eq!(options.window(vec![1, 2, 3, 4]), vec![2, 3]);
        assert_eq!(FetchOptions::default().window(vec![1, 2]), vec![1, 2]);
    }

    #[test]
    fn test_without_paging_keeps_other_params() {
        let options = FetchOptions::new(true)
            .with_param("limit", "2")
            .with_param("descending", "true")
            .with_param("skip", "1");
        let unpaged = options.without_paging();
        assert!(unpaged.include_docs);
        assert_eq!(unpaged.limit(), None);
        assert_eq!(unpaged.skip(), 0);
        assert!(unpaged.descending());
    }

    #[test]
    fn test_range_contains_ascending() {
        let range = KeyRange {
            start: Some("b".to_string()),
            end: Some("c".to_string()),
            inclusive_end: true,
        };
        assert!(!range.contains("a", false));
        assert!(range.contains("b", false));
        assert!(range.contains("c", false));
        assert!(!range.contains("d", false));

        let exclusive = KeyRange {
            inclusive_end: false,
            ..range
        };
        assert!(!exclusive.contains("c", false));
    }

    #[test]
    fn test_range_contains_descending() {
        let range = KeyRange {
            start: Some("c".to_string()),
            end: Some("b".to_string()),
            inclusive_end: false,
        };
        assert!(range.contains("c", true));
        assert!(!range.contains("b", true));
        assert!(!range.contains("d", true));
    }
}
