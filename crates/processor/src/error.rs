//! Processor error types

use thiserror::Error;

/// Result type for processor operations
pub type Result<T> = std::result::Result<T, ProcessorError>;

/// Errors raised by processors and the processor registry
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// Processing one message failed
    #[error("processing failed: {0}")]
    Failed(String),

    /// The registry has no processor under the requested name
    #[error("unknown processor '{name}', available: [{available}]")]
    UnknownName {
        /// The requested name
        name: String,
        /// Comma-separated registered names
        available: String,
    },

    /// A processor factory rejected its configuration
    #[error("invalid processor parameter '{param}': {message}")]
    InvalidParam {
        /// Parameter name
        param: &'static str,
        /// Why it was rejected
        message: String,
    },
}

impl ProcessorError {
    /// Create a processing failure
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Create an invalid-parameter error
    pub fn invalid_param(param: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParam {
            param,
            message: message.into(),
        }
    }
}
