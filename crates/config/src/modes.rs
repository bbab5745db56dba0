//! Per-mode configuration sub-trees

use serde::Deserialize;

use crate::BrokerConfig;

/// Funnel mode: many sources, one destination topic
///
/// # Example
///
/// ```toml
/// [funnel]
/// destination_topic = "merged"
///
/// [[funnel.sources]]
/// type = "mock"
/// topics = ["t1", "t2"]
///
/// [funnel.destination]
/// type = "mock"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct FunnelConfig {
    /// Upstream brokers, each with its own topic list
    pub sources: Vec<BrokerConfig>,

    /// Downstream broker
    pub destination: BrokerConfig,

    /// The one topic every message lands on
    pub destination_topic: String,
}

/// How fan mode picks a destination per message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverKind {
    /// Read the topic from a message header
    Header,
    /// Read the topic from a top-level JSON payload key
    PayloadKey,
}

/// Destination resolver settings for fan mode
#[derive(Debug, Clone, Deserialize)]
pub struct ResolverConfig {
    /// Where to look for the topic
    #[serde(rename = "type")]
    pub kind: ResolverKind,

    /// Header or payload key holding the topic name
    pub key: String,
}

/// Fan mode: one source topic, destinations resolved per message
///
/// # Example
///
/// ```toml
/// [fan]
/// source_topic = "ingest"
///
/// [fan.source]
/// type = "mock"
///
/// [fan.destination]
/// type = "mock"
///
/// [fan.destination_resolver]
/// type = "header"
/// key = "destination_topic"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct FanConfig {
    /// Upstream broker
    pub source: BrokerConfig,

    /// The single topic to consume
    pub source_topic: String,

    /// Downstream broker
    pub destination: BrokerConfig,

    /// Per-message destination selection
    pub destination_resolver: ResolverConfig,
}

/// One source -> destination pair
#[derive(Debug, Clone, Deserialize)]
pub struct TopicMapping {
    /// Topic to consume
    pub source_topic: String,

    /// Topic to publish to
    pub destination_topic: String,
}

/// One-to-one mode: independent topic mappings over one broker pair
///
/// # Example
///
/// ```toml
/// [one_to_one]
///
/// [one_to_one.source]
/// type = "mock"
///
/// [one_to_one.destination]
/// type = "mock"
///
/// [[one_to_one.mappings]]
/// source_topic = "orders"
/// destination_topic = "orders-processed"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct OneToOneConfig {
    /// Upstream broker (subscribes to every mapped source topic)
    pub source: BrokerConfig,

    /// Downstream broker
    pub destination: BrokerConfig,

    /// The mappings; source topics must be unique
    pub mappings: Vec<TopicMapping>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_funnel_deserialize() {
        let funnel: FunnelConfig = toml::from_str(
            r#"
destination_topic = "out"

[[sources]]
type = "mock"
topics = ["t1"]

[destination]
type = "mock"
"#,
        )
        .unwrap();
        assert_eq!(funnel.destination_topic, "out");
        assert_eq!(funnel.sources.len(), 1);
    }

    #[test]
    fn test_resolver_kinds() {
        let resolver: ResolverConfig =
            toml::from_str("type = \"header\"\nkey = \"dest\"").unwrap();
        assert_eq!(resolver.kind, ResolverKind::Header);

        let resolver: ResolverConfig =
            toml::from_str("type = \"payload_key\"\nkey = \"routing_key\"").unwrap();
        assert_eq!(resolver.kind, ResolverKind::PayloadKey);

        assert!(toml::from_str::<ResolverConfig>("type = \"regex\"\nkey = \"k\"").is_err());
    }

    #[test]
    fn test_one_to_one_deserialize() {
        let oto: OneToOneConfig = toml::from_str(
            r#"
[source]
type = "mock"

[destination]
type = "mock"

[[mappings]]
source_topic = "a"
destination_topic = "a-out"

[[mappings]]
source_topic = "b"
destination_topic = "b-out"
"#,
        )
        .unwrap();
        assert_eq!(oto.mappings.len(), 2);
        assert_eq!(oto.mappings[0].destination_topic, "a-out");
    }
}
