//! Priority filter processor - drops low-priority JSON messages

use async_trait::async_trait;
use serde_json::Value;
use shunt_protocol::Message;

use crate::{Processor, ProcessorError, Result};

/// Drops messages whose JSON payload carries a priority below a threshold
///
/// The payload is parsed as a JSON object and the integer under `key` is
/// compared against `min_priority`; below the threshold the message is
/// filtered (an intentional drop, not an error). Messages whose payload is
/// not a JSON object, or that lack the key, pass through unchanged.
#[derive(Debug, Clone)]
pub struct PriorityFilterProcessor {
    key: String,
    min_priority: i64,
}

impl PriorityFilterProcessor {
    /// Create a filter over `key` with the given threshold
    pub fn new(key: impl Into<String>, min_priority: i64) -> Self {
        Self {
            key: key.into(),
            min_priority,
        }
    }

    /// Build from a config parameter table
    ///
    /// Recognized parameters: `key` (default `"priority"`) and
    /// `min_priority` (default 5).
    pub fn from_params(params: &toml::Table) -> Result<Self> {
        let key = match params.get("key") {
            None => "priority".to_owned(),
            Some(value) => value
                .as_str()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| {
                    ProcessorError::invalid_param("key", "must be a non-empty string")
                })?
                .to_owned(),
        };
        let min_priority = match params.get("min_priority") {
            None => 5,
            Some(value) => value.as_integer().ok_or_else(|| {
                ProcessorError::invalid_param("min_priority", "must be an integer")
            })?,
        };
        Ok(Self::new(key, min_priority))
    }
}

#[async_trait]
impl Processor for PriorityFilterProcessor {
    async fn process(&self, message: Message) -> Result<Option<Message>> {
        let priority = serde_json::from_slice::<Value>(message.payload())
            .ok()
            .and_then(|v| v.get(&self.key).and_then(Value::as_i64));

        match priority {
            Some(p) if p < self.min_priority => {
                tracing::trace!(
                    priority = p,
                    threshold = self.min_priority,
                    "message filtered"
                );
                Ok(None)
            }
            _ => Ok(Some(message)),
        }
    }

    fn name(&self) -> &'static str {
        "priority_filter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_drops_below_threshold() {
        let processor = PriorityFilterProcessor::new("priority", 5);
        let msg = Message::new("t", r#"{"priority": 2}"#);

        assert!(processor.process(msg).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_keeps_at_or_above_threshold() {
        let processor = PriorityFilterProcessor::new("priority", 5);

        let at = Message::new("t", r#"{"priority": 5}"#);
        assert!(processor.process(at).await.unwrap().is_some());

        let above = Message::new("t", r#"{"priority": 9}"#);
        assert!(processor.process(above).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_non_json_passes_through() {
        let processor = PriorityFilterProcessor::new("priority", 5);
        let msg = Message::new("t", "not json");

        let out = processor.process(msg).await.unwrap().unwrap();
        assert_eq!(out.payload().as_ref(), b"not json");
    }

    #[tokio::test]
    async fn test_missing_key_passes_through() {
        let processor = PriorityFilterProcessor::new("priority", 5);
        let msg = Message::new("t", r#"{"other": 1}"#);

        assert!(processor.process(msg).await.unwrap().is_some());
    }

    #[test]
    fn test_params() {
        let params: toml::Table = toml::from_str("key = \"level\"\nmin_priority = 3").unwrap();
        let processor = PriorityFilterProcessor::from_params(&params).unwrap();
        assert_eq!(processor.key, "level");
        assert_eq!(processor.min_priority, 3);

        let bad: toml::Table = toml::from_str("min_priority = \"high\"").unwrap();
        assert!(PriorityFilterProcessor::from_params(&bad).is_err());
    }
}
