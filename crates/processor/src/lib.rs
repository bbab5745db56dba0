//! Shunt - Processor
//!
//! The domain stage's per-message transformation hook.
//!
//! # Contract
//!
//! ```text
//! process(Message) -> Ok(Some(message))  forward (possibly replaced)
//!                     Ok(None)           drop intentionally (filter)
//!                     Err(_)             error: counted against the source
//!                                        topic, message dropped, flow continues
//! ```
//!
//! Processors are selected by name in configuration and instantiated once
//! per flow through the [`ProcessorRegistry`]. Built-ins:
//!
//! - `identity` - pass-through (the default)
//! - `header_stamp` - annotates messages with a processing timestamp
//! - `priority_filter` - drops JSON messages below a priority threshold
//!
//! # Design Principles
//!
//! - **Fast**: processors sit on the hot path between the two queues
//! - **Thread-safe**: one instance is shared by every domain worker
//! - **Isolated failure**: an error costs one message, never a worker

mod error;
mod header_stamp;
mod identity;
mod priority_filter;
mod registry;

pub use error::{ProcessorError, Result};
pub use header_stamp::HeaderStampProcessor;
pub use identity::IdentityProcessor;
pub use priority_filter::PriorityFilterProcessor;
pub use registry::{ProcessorRegistry, DEFAULT_PROCESSOR};

use async_trait::async_trait;
use shunt_protocol::Message;

/// A per-message transformation applied in the domain stage
#[async_trait]
pub trait Processor: Send + Sync {
    /// Process one message
    ///
    /// Returning `Ok(None)` drops the message as an intentional filter;
    /// errors drop it and count against its source topic.
    async fn process(&self, message: Message) -> Result<Option<Message>>;

    /// Registry name of this processor (for logging)
    fn name(&self) -> &'static str;
}
