//! Per-message destination resolution for fan mode
//!
//! Fan mode discovers destination topics at runtime from message content.
//! Nothing is pre-declared: whatever topic the resolver produces is handed
//! to the publisher, which either accepts it or fails that message alone.

use serde_json::{Map, Value};
use shunt_protocol::Message;

use crate::{Result, RouteError};

/// Resolves the destination topic of a message from its content
///
/// # Example
///
/// ```
/// use shunt_protocol::Message;
/// use shunt_routing::DestinationResolver;
///
/// let resolver = DestinationResolver::header("destination_topic");
/// let msg = Message::new("in", "X").with_header("destination_topic", "orders");
/// assert_eq!(resolver.resolve(&msg).unwrap(), "orders");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationResolver {
    /// Take the destination from a message header
    Header {
        /// Header key holding the topic name
        key: String,
    },

    /// Take the destination from a top-level key of a JSON payload
    PayloadKey {
        /// Object key holding the topic name
        key: String,
    },
}

impl DestinationResolver {
    /// Create a header-based resolver
    pub fn header(key: impl Into<String>) -> Self {
        Self::Header { key: key.into() }
    }

    /// Create a payload-key resolver
    pub fn payload_key(key: impl Into<String>) -> Self {
        Self::PayloadKey { key: key.into() }
    }

    /// Resolve the destination topic for a message
    ///
    /// # Errors
    ///
    /// - `MissingHeader` / `MissingKey` when the configured key is absent
    /// - `InvalidPayload` when payload routing meets a non-JSON-object payload
    /// - `UnroutableValue` when the value under the key is not a string,
    ///   number, or boolean
    pub fn resolve(&self, message: &Message) -> Result<String> {
        match self {
            Self::Header { key } => message
                .header(key)
                .map(str::to_owned)
                .ok_or_else(|| RouteError::missing_header(key)),
            Self::PayloadKey { key } => {
                let object: Map<String, Value> = serde_json::from_slice(message.payload())?;
                let value = object
                    .get(key)
                    .ok_or_else(|| RouteError::missing_key(key))?;
                coerce_topic(value, key)
            }
        }
    }
}

/// Coerce a JSON value into a topic name
///
/// Strings pass through; numbers and booleans use their display form.
/// Nulls, arrays, and objects cannot name a topic.
fn coerce_topic(value: &Value, key: &str) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(RouteError::UnroutableValue {
            key: key.to_owned(),
        }),
    }
}
