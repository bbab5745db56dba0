//! Adapter error taxonomy
//!
//! Every adapter failure maps onto one of three severities the flow engine
//! understands: `Connection` (fatal at startup), `Transient` (costs one
//! message), `Fatal` (the broker session is unrecoverable). Transient and
//! fatal errors may carry a topic for metric attribution.

use thiserror::Error;

/// Result type for adapter operations
pub type Result<T> = std::result::Result<T, AdapterError>;

/// Errors reported by broker adapters and the adapter registry
#[derive(Debug, Clone, Error)]
pub enum AdapterError {
    /// Opening the broker connection failed
    #[error("connection error: {0}")]
    Connection(String),

    /// A single operation failed; the next one may succeed
    #[error("transient error: {message}")]
    Transient {
        /// Topic to attribute the error to, when known
        topic: Option<String>,
        /// What went wrong
        message: String,
    },

    /// The broker declared the session unrecoverable
    #[error("fatal error: {message}")]
    Fatal {
        /// Topic to attribute the error to, when known
        topic: Option<String>,
        /// What went wrong
        message: String,
    },

    /// The registry has no factory for the requested adapter type
    #[error("unknown adapter type '{kind}', available: [{available}]")]
    UnknownKind {
        /// The requested type
        kind: String,
        /// Comma-separated registered types
        available: String,
    },

    /// An adapter factory rejected its configuration
    #[error("invalid adapter parameter '{param}': {message}")]
    InvalidParam {
        /// Parameter name
        param: &'static str,
        /// Why it was rejected
        message: String,
    },
}

impl AdapterError {
    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a transient error with no topic attribution
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            topic: None,
            message: message.into(),
        }
    }

    /// Create a transient error attributed to a topic
    pub fn transient_on(topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transient {
            topic: Some(topic.into()),
            message: message.into(),
        }
    }

    /// Create a fatal error with no topic attribution
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Fatal {
            topic: None,
            message: message.into(),
        }
    }

    /// Create a fatal error attributed to a topic
    pub fn fatal_on(topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fatal {
            topic: Some(topic.into()),
            message: message.into(),
        }
    }

    /// Create an invalid-parameter error
    pub fn invalid_param(param: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParam {
            param,
            message: message.into(),
        }
    }

    /// Whether this error ends the flow (as opposed to one message)
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. })
    }

    /// The topic this error is attributed to, when known
    #[inline]
    pub fn topic(&self) -> Option<&str> {
        match self {
            Self::Transient { topic, .. } | Self::Fatal { topic, .. } => topic.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity() {
        assert!(!AdapterError::transient("poll failed").is_fatal());
        assert!(AdapterError::fatal("session closed").is_fatal());
        assert!(!AdapterError::connection("refused").is_fatal());
    }

    #[test]
    fn test_topic_attribution() {
        let err = AdapterError::transient_on("orders", "send failed");
        assert_eq!(err.topic(), Some("orders"));

        let err = AdapterError::fatal_on("payments", "revoked");
        assert_eq!(err.topic(), Some("payments"));

        assert_eq!(AdapterError::connection("refused").topic(), None);
        assert_eq!(AdapterError::transient("poll failed").topic(), None);
    }

    #[test]
    fn test_display() {
        let err = AdapterError::UnknownKind {
            kind: "kafka".into(),
            available: "mock".into(),
        };
        assert!(err.to_string().contains("kafka"));
        assert!(err.to_string().contains("mock"));

        let err = AdapterError::invalid_param("interval_ms", "must be positive");
        assert!(err.to_string().contains("interval_ms"));
    }
}
