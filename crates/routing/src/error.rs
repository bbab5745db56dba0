//! Routing error types

use thiserror::Error;

/// Result type for routing operations
pub type Result<T> = std::result::Result<T, RouteError>;

/// Errors raised while selecting a destination topic for a message
#[derive(Debug, Error)]
pub enum RouteError {
    /// Header-based routing found no value under the configured key
    #[error("routing header '{key}' not present on message")]
    MissingHeader {
        /// The configured header key
        key: String,
    },

    /// Payload-based routing found no value under the configured key
    #[error("routing key '{key}' not present in payload")]
    MissingKey {
        /// The configured payload key
        key: String,
    },

    /// Payload could not be parsed as a JSON object
    #[error("payload is not a JSON object: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    /// Payload parsed, but the routing value cannot name a topic
    #[error("routing key '{key}' holds a value that cannot name a topic")]
    UnroutableValue {
        /// The configured payload key
        key: String,
    },

    /// One-to-one routing has no mapping for the message's source topic
    #[error("no destination mapping for source topic '{topic}'")]
    UnmappedTopic {
        /// The unmapped source topic
        topic: String,
    },
}

impl RouteError {
    /// Create a MissingHeader error
    pub fn missing_header(key: impl Into<String>) -> Self {
        Self::MissingHeader { key: key.into() }
    }

    /// Create a MissingKey error
    pub fn missing_key(key: impl Into<String>) -> Self {
        Self::MissingKey { key: key.into() }
    }

    /// Create an UnmappedTopic error
    pub fn unmapped(topic: impl Into<String>) -> Self {
        Self::UnmappedTopic {
            topic: topic.into(),
        }
    }
}
