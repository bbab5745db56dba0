//! Header stamp processor - annotates messages in flight

use async_trait::async_trait;
use chrono::Utc;
use shunt_protocol::Message;

use crate::{Processor, Result};

/// Adds a `processed_at` RFC 3339 timestamp and a `processor` header
///
/// Handy for tracing messages across brokers when debugging a bridge
/// deployment.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderStampProcessor;

impl HeaderStampProcessor {
    /// Create a new header stamp processor
    #[inline]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Processor for HeaderStampProcessor {
    async fn process(&self, mut message: Message) -> Result<Option<Message>> {
        message.insert_header("processed_at", Utc::now().to_rfc3339());
        message.insert_header("processor", self.name());
        Ok(Some(message))
    }

    fn name(&self) -> &'static str {
        "header_stamp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stamps_headers() {
        let processor = HeaderStampProcessor::new();
        let msg = Message::new("t", "x");

        let out = processor.process(msg).await.unwrap().unwrap();
        assert!(out.header("processed_at").is_some());
        assert_eq!(out.header("processor"), Some("header_stamp"));
        // Payload untouched
        assert_eq!(out.payload().as_ref(), b"x");
    }

    #[tokio::test]
    async fn test_existing_headers_kept() {
        let processor = HeaderStampProcessor::new();
        let msg = Message::new("t", "x").with_header("trace", "abc");

        let out = processor.process(msg).await.unwrap().unwrap();
        assert_eq!(out.header("trace"), Some("abc"));
    }
}
