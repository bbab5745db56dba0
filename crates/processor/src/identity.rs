//! Identity processor - the default pass-through

use async_trait::async_trait;
use shunt_protocol::Message;

use crate::{Processor, Result};

/// Forwards every message unchanged
///
/// The default when no processor is configured. Also useful for measuring
/// pipeline overhead in isolation.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityProcessor;

impl IdentityProcessor {
    /// Create a new identity processor
    #[inline]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Processor for IdentityProcessor {
    async fn process(&self, message: Message) -> Result<Option<Message>> {
        Ok(Some(message))
    }

    fn name(&self) -> &'static str {
        "identity"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passes_through_unchanged() {
        let processor = IdentityProcessor::new();
        let msg = Message::new("t", "payload").with_header("k", "v");

        let out = processor.process(msg).await.unwrap().unwrap();
        assert_eq!(out.payload().as_ref(), b"payload");
        assert_eq!(out.header("k"), Some("v"));
        assert_eq!(processor.name(), "identity");
    }
}
