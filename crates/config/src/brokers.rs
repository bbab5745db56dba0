//! Broker endpoint configuration
//!
//! One block per broker connection, on either side of the flow. The
//! `type` field selects an adapter from the registry; the `connection`
//! table is handed to that adapter's factory uninterpreted.

use serde::Deserialize;

/// One broker endpoint (a source or a destination)
///
/// # Example
///
/// ```toml
/// [[funnel.sources]]
/// type = "mock"
/// topics = ["t1", "t2"]
///
/// [funnel.sources.connection]
/// interval = 100
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct BrokerConfig {
    /// Adapter type name (registry key)
    #[serde(rename = "type")]
    pub kind: String,

    /// Free-form connection table handed to the adapter factory
    #[serde(default)]
    pub connection: toml::Table,

    /// Topics to subscribe to (funnel sources only; the other modes
    /// derive their subscription from the mode sub-tree)
    #[serde(default)]
    pub topics: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal() {
        let broker: BrokerConfig = toml::from_str("type = \"mock\"").unwrap();
        assert_eq!(broker.kind, "mock");
        assert!(broker.connection.is_empty());
        assert!(broker.topics.is_empty());
    }

    #[test]
    fn test_full() {
        let broker: BrokerConfig = toml::from_str(
            r#"
type = "mock"
topics = ["a", "b"]

[connection]
interval = 50
"#,
        )
        .unwrap();
        assert_eq!(broker.kind, "mock");
        assert_eq!(broker.topics, vec!["a", "b"]);
        assert_eq!(
            broker.connection.get("interval").and_then(|v| v.as_integer()),
            Some(50)
        );
    }
}
