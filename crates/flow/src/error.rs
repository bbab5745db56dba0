//! Flow error types

use thiserror::Error;

use shunt_adapters::AdapterError;

use crate::FlowState;

/// Errors raised while starting a flow
///
/// Runtime errors never surface here: per-message failures are counted and
/// logged, and fatal adapter errors drive the flow to `Failed` through its
/// drain protocol instead of an error return.
#[derive(Debug, Error)]
pub enum FlowError {
    /// A lifecycle method was called in the wrong state
    #[error("flow is {actual:?}, expected {expected:?}")]
    InvalidState {
        /// State the operation requires
        expected: FlowState,
        /// State the flow is actually in
        actual: FlowState,
    },

    /// The publisher's broker connection could not be opened
    #[error("failed to open publisher: {0}")]
    OpenPublisher(#[source] AdapterError),

    /// A source's broker connection or subscription failed
    #[error("failed to open source '{label}': {source}")]
    OpenSource {
        /// First subscribed topic, for identification
        label: String,
        /// The underlying adapter error
        #[source]
        source: AdapterError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = FlowError::InvalidState {
            expected: FlowState::Created,
            actual: FlowState::Running,
        };
        assert!(err.to_string().contains("Running"));
        assert!(err.to_string().contains("Created"));

        let err = FlowError::OpenSource {
            label: "orders".into(),
            source: AdapterError::connection("refused"),
        };
        assert!(err.to_string().contains("orders"));
        assert!(err.to_string().contains("refused"));
    }
}
