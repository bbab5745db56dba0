//! Source and Publisher contracts
//!
//! These two traits are the only view the flow engine has of a broker.
//! Implementations own their client state; the engine owns the call
//! discipline described on each method.

use std::time::Duration;

use async_trait::async_trait;
use shunt_protocol::Message;

use crate::Result;

/// An upstream broker client producing messages into the flow
///
/// `consume` is called from exactly one task for the lifetime of the
/// source, so implementations need no internal consume-side locking.
#[async_trait]
pub trait Source: Send {
    /// Establish the broker connection
    ///
    /// # Errors
    ///
    /// `AdapterError::Connection` if the broker is unreachable; the flow
    /// never starts.
    async fn open(&mut self) -> Result<()>;

    /// Subscribe to the given topics
    ///
    /// Called once, after `open` and before the first `consume`.
    async fn subscribe(&mut self, topics: &[String]) -> Result<()>;

    /// Fetch the next message, waiting at most `timeout`
    ///
    /// Returns `Ok(None)` when idle. A `Transient` error is logged and
    /// counted; a `Fatal` error fails the whole flow.
    async fn consume(&mut self, timeout: Duration) -> Result<Option<Message>>;

    /// Release all broker resources; idempotent
    async fn close(&mut self) -> Result<()>;
}

/// A downstream broker client consuming messages from the flow
///
/// `publish` is called from many tasks concurrently (the publish worker
/// pool). A client that is not multi-writer-safe must wrap itself in a
/// mutex.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Establish the broker connection
    ///
    /// # Errors
    ///
    /// `AdapterError::Connection` if the broker is unreachable; the flow
    /// never starts.
    async fn open(&mut self) -> Result<()>;

    /// Publish a message to a topic
    ///
    /// Topic names are not pre-declared; the publisher either tolerates an
    /// arbitrary topic or fails that message with a `Transient` error.
    /// A `Fatal` error fails the whole flow.
    async fn publish(&self, topic: &str, message: &Message) -> Result<()>;

    /// Flush pending batches within a bounded deadline and release
    /// resources; idempotent
    async fn close(&self) -> Result<()>;
}
