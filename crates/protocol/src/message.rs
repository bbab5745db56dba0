//! Message - the unit of transfer between brokers
//!
//! A `Message` is captured by a source adapter, optionally replaced by a
//! domain processor, and handed to a publisher adapter. The flow fills in
//! `destination_topic` before the publish stage.

use std::collections::HashMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};

/// Opaque metadata value attached by a broker adapter
///
/// Carries broker-native details (partition, offset, delivery tag) through
/// the pipeline without interpretation.
pub type MetadataValue = serde_json::Value;

/// A single message moving through the bridge
///
/// # Example
///
/// ```
/// use shunt_protocol::Message;
///
/// let msg = Message::new("orders", "order-123")
///     .with_header("destination_topic", "orders-processed");
///
/// assert_eq!(msg.source_topic(), "orders");
/// assert_eq!(msg.header("destination_topic"), Some("orders-processed"));
/// assert!(msg.destination_topic().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Message {
    /// Opaque payload bytes
    payload: Bytes,

    /// String headers, unique keys
    headers: HashMap<String, String>,

    /// Topic the message was consumed from
    source_topic: String,

    /// Topic the message will be published to (set by the flow)
    destination_topic: Option<String>,

    /// Moment of origin capture
    timestamp: DateTime<Utc>,

    /// Broker-native metadata, passed through untouched
    metadata: HashMap<String, MetadataValue>,
}

impl Message {
    /// Create a message with the given origin topic and payload
    ///
    /// The timestamp is captured at construction.
    pub fn new(source_topic: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
            headers: HashMap::new(),
            source_topic: source_topic.into(),
            destination_topic: None,
            timestamp: Utc::now(),
            metadata: HashMap::new(),
        }
    }

    /// Add a header (builder style)
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Attach a metadata entry (builder style)
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: MetadataValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Override the capture timestamp (builder style)
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Get the payload
    #[inline]
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Payload size in bytes
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Get a header value by key
    #[inline]
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }

    /// All headers
    #[inline]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Insert a header, replacing any existing value
    ///
    /// Processors use this to annotate messages in place.
    #[inline]
    pub fn insert_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(key.into(), value.into());
    }

    /// Replace the payload
    ///
    /// Processors use this when rewriting message content.
    #[inline]
    pub fn set_payload(&mut self, payload: impl Into<Bytes>) {
        self.payload = payload.into();
    }

    /// Topic the message was consumed from
    #[inline]
    pub fn source_topic(&self) -> &str {
        &self.source_topic
    }

    /// Topic the message will be published to, once the flow has chosen it
    #[inline]
    pub fn destination_topic(&self) -> Option<&str> {
        self.destination_topic.as_deref()
    }

    /// Set the destination topic (called by the domain stage)
    #[inline]
    pub fn set_destination_topic(&mut self, topic: impl Into<String>) {
        self.destination_topic = Some(topic.into());
    }

    /// Moment of origin capture
    #[inline]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Broker-native metadata
    #[inline]
    pub fn metadata(&self) -> &HashMap<String, MetadataValue> {
        &self.metadata
    }
}
