//! Configuration error types

use std::io;

use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("failed to read config file '{path}': {source}")]
    Io {
        /// Path to the file
        path: String,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The selected mode's sub-tree is missing
    #[error("mode is '{section}' but the [{section}] section is missing")]
    MissingSection {
        /// Section name the mode requires
        section: &'static str,
    },

    /// A field holds an unusable value
    #[error("[{section}] has invalid {field}: {message}")]
    InvalidValue {
        /// Config section
        section: &'static str,
        /// Field name
        field: &'static str,
        /// Why the value was rejected
        message: String,
    },

    /// Two one-to-one mappings share a source topic
    #[error("duplicate source topic '{topic}' in one_to_one mappings")]
    DuplicateSourceTopic {
        /// The duplicated topic
        topic: String,
    },
}

impl ConfigError {
    /// Create a MissingSection error
    pub fn missing_section(section: &'static str) -> Self {
        Self::MissingSection { section }
    }

    /// Create an InvalidValue error
    pub fn invalid_value(
        section: &'static str,
        field: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            section,
            field,
            message: message.into(),
        }
    }

    /// Create a DuplicateSourceTopic error
    pub fn duplicate_source_topic(topic: impl Into<String>) -> Self {
        Self::DuplicateSourceTopic {
            topic: topic.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_section() {
        let err = ConfigError::missing_section("fan");
        assert!(err.to_string().contains("[fan]"));
    }

    #[test]
    fn test_invalid_value() {
        let err = ConfigError::invalid_value(
            "back_pressure",
            "queue_low_watermark",
            "must not exceed queue_high_watermark",
        );
        assert!(err.to_string().contains("back_pressure"));
        assert!(err.to_string().contains("queue_low_watermark"));
    }

    #[test]
    fn test_duplicate_source_topic() {
        let err = ConfigError::duplicate_source_topic("orders");
        assert!(err.to_string().contains("orders"));
    }
}
