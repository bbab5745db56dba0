//! One-to-one topic mapping table
//!
//! Compiled once from configuration; lookups in the domain stage are O(1)
//! with no allocation.

use std::collections::HashMap;

/// Pre-compiled `source_topic -> destination_topic` table
///
/// # Example
///
/// ```
/// use shunt_routing::TopicMap;
///
/// let map = TopicMap::from_pairs([
///     ("orders", "orders-processed"),
///     ("payments", "payments-processed"),
/// ]);
///
/// assert_eq!(map.destination("orders"), Some("orders-processed"));
/// assert_eq!(map.destination("unknown"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TopicMap {
    routes: HashMap<String, String>,
}

impl TopicMap {
    /// Build a map from `(source, destination)` pairs
    ///
    /// Duplicate source topics keep the last entry; configuration
    /// validation rejects duplicates before this point.
    pub fn from_pairs<I, S, D>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, D)>,
        S: Into<String>,
        D: Into<String>,
    {
        Self {
            routes: pairs
                .into_iter()
                .map(|(s, d)| (s.into(), d.into()))
                .collect(),
        }
    }

    /// Look up the destination for a source topic
    #[inline]
    pub fn destination(&self, source_topic: &str) -> Option<&str> {
        self.routes.get(source_topic).map(String::as_str)
    }

    /// All source topics, for building the source subscription
    pub fn source_topics(&self) -> Vec<String> {
        self.routes.keys().cloned().collect()
    }

    /// Number of mappings
    #[inline]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the map holds no mappings
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let map = TopicMap::from_pairs([("a", "a-out"), ("b", "b-out")]);

        assert_eq!(map.destination("a"), Some("a-out"));
        assert_eq!(map.destination("b"), Some("b-out"));
        assert_eq!(map.destination("c"), None);
        assert_eq!(map.len(), 2);
        assert!(!map.is_empty());
    }

    #[test]
    fn test_source_topics() {
        let map = TopicMap::from_pairs([("a", "x"), ("b", "y")]);
        let mut topics = map.source_topics();
        topics.sort();
        assert_eq!(topics, vec!["a", "b"]);
    }

    #[test]
    fn test_empty() {
        let map = TopicMap::default();
        assert!(map.is_empty());
        assert_eq!(map.destination("a"), None);
    }
}
