//! Mock adapter - in-memory source and publisher
//!
//! Backs the integration suite, local development, and the `type = "mock"`
//! config blocks. The source either replays a scripted sequence of
//! messages and errors (pushed through a [`MockFeed`] handle) or
//! self-generates counter messages per subscribed topic on an interval.
//! The publisher records everything it is given, observable through a
//! [`PublishLog`] handle, with optional per-publish delay and scripted
//! failures.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use shunt_protocol::Message;

use crate::{AdapterError, Publisher, Result, Source};


/// Default spacing between self-generated messages
const DEFAULT_GENERATE_INTERVAL: Duration = Duration::from_millis(100);

/// One scripted source event
#[derive(Debug, Clone)]
pub enum MockEvent {
    /// Deliver this message
    Message(Message),
    /// Fail the consume call with a transient error
    Transient(String),
    /// Fail the consume call with a fatal error
    Fatal(String),
}

/// Shared handle for scripting a [`MockSource`]
///
/// Clones share the same queue, so a test can keep feeding a source that
/// has already been moved into a running flow.
#[derive(Debug, Clone, Default)]
pub struct MockFeed {
    events: Arc<Mutex<VecDeque<MockEvent>>>,
}

impl MockFeed {
    /// Queue a message for delivery
    pub fn push_message(&self, message: Message) {
        self.events.lock().push_back(MockEvent::Message(message));
    }

    /// Queue a transient consume failure
    pub fn push_transient(&self, reason: impl Into<String>) {
        self.events
            .lock()
            .push_back(MockEvent::Transient(reason.into()));
    }

    /// Queue a fatal consume failure
    pub fn push_fatal(&self, reason: impl Into<String>) {
        self.events.lock().push_back(MockEvent::Fatal(reason.into()));
    }

    /// Number of undelivered events
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether every queued event has been consumed
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    fn pop(&self) -> Option<MockEvent> {
        self.events.lock().pop_front()
    }
}

/// Self-generation settings for demo mode
#[derive(Debug)]
struct Generator {
    interval: Duration,
    remaining: Option<u64>,
    counter: u64,
    next_at: Option<tokio::time::Instant>,
}

/// In-memory message source
///
/// # Example
///
/// ```
/// use shunt_adapters::mock::MockSource;
/// use shunt_protocol::Message;
///
/// let source = MockSource::with_messages(vec![Message::new("t1", "a")]);
/// let feed = source.feed();
/// feed.push_message(Message::new("t1", "b"));
/// assert_eq!(feed.len(), 2);
/// ```
#[derive(Debug)]
pub struct MockSource {
    feed: MockFeed,
    generator: Option<Generator>,
    subscribed: Vec<String>,
    next_topic: usize,
    open: bool,
}

impl MockSource {
    /// Create a scripted source with an empty feed
    pub fn new() -> Self {
        Self {
            feed: MockFeed::default(),
            generator: None,
            subscribed: Vec::new(),
            next_topic: 0,
            open: false,
        }
    }

    /// Create a scripted source pre-seeded with messages
    pub fn with_messages(messages: Vec<Message>) -> Self {
        let source = Self::new();
        for message in messages {
            source.feed.push_message(message);
        }
        source
    }

    /// Create a self-generating source
    ///
    /// Produces one counter message per `interval`, rotating through the
    /// subscribed topics; `count` caps the total when set.
    pub fn generating(interval: Duration, count: Option<u64>) -> Self {
        Self {
            generator: Some(Generator {
                interval,
                remaining: count,
                counter: 0,
                next_at: None,
            }),
            ..Self::new()
        }
    }

    /// Build from a config parameter table
    ///
    /// Recognized parameters: `interval` (milliseconds between generated
    /// messages, default 100) and `count` (total message cap, unlimited
    /// when absent).
    pub fn from_params(params: &toml::Table) -> Result<Self> {
        let interval = match params.get("interval") {
            None => DEFAULT_GENERATE_INTERVAL,
            Some(value) => {
                let ms = value.as_integer().filter(|ms| *ms > 0).ok_or_else(|| {
                    AdapterError::invalid_param("interval", "must be a positive integer (ms)")
                })?;
                Duration::from_millis(ms as u64)
            }
        };
        let count = match params.get("count") {
            None => None,
            Some(value) => Some(value.as_integer().filter(|n| *n >= 0).ok_or_else(|| {
                AdapterError::invalid_param("count", "must be a non-negative integer")
            })? as u64),
        };
        Ok(Self::generating(interval, count))
    }

    /// Get a handle for scripting this source
    pub fn feed(&self) -> MockFeed {
        self.feed.clone()
    }

    /// Topics this source has subscribed to
    pub fn subscribed(&self) -> &[String] {
        &self.subscribed
    }

    fn generate(&mut self) -> Option<Message> {
        let generator = self.generator.as_mut()?;
        if self.subscribed.is_empty() || generator.remaining == Some(0) {
            return None;
        }
        if let Some(remaining) = generator.remaining.as_mut() {
            *remaining -= 1;
        }
        generator.counter += 1;
        generator.next_at = Some(tokio::time::Instant::now() + generator.interval);
        let n = generator.counter;
        let topic = self.subscribed[self.next_topic % self.subscribed.len()].clone();
        self.next_topic += 1;
        Some(
            Message::new(topic, format!("mock message {n}"))
                .with_header("source", "mock")
                .with_header("count", n.to_string()),
        )
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for MockSource {
    async fn open(&mut self) -> Result<()> {
        self.open = true;
        tracing::debug!("mock source opened");
        Ok(())
    }

    async fn subscribe(&mut self, topics: &[String]) -> Result<()> {
        self.subscribed = topics.to_vec();
        tracing::debug!(topics = ?self.subscribed, "mock source subscribed");
        Ok(())
    }

    async fn consume(&mut self, timeout: Duration) -> Result<Option<Message>> {
        if !self.open {
            return Err(AdapterError::transient("mock source is not open"));
        }

        if let Some(event) = self.feed.pop() {
            return match event {
                MockEvent::Message(message) => Ok(Some(message)),
                MockEvent::Transient(reason) => Err(AdapterError::transient(reason)),
                MockEvent::Fatal(reason) => Err(AdapterError::fatal(reason)),
            };
        }

        if self.generator.is_some() {
            let now = tokio::time::Instant::now();
            let due = self
                .generator
                .as_ref()
                .and_then(|g| g.next_at)
                .unwrap_or(now);
            if due > now + timeout {
                // Not due within this poll
                tokio::time::sleep(timeout).await;
                return Ok(None);
            }
            if due > now {
                tokio::time::sleep(due - now).await;
            }
            if let Some(message) = self.generate() {
                return Ok(Some(message));
            }
        }

        // Scripted feed drained, or generator exhausted: idle for the poll
        tokio::time::sleep(timeout).await;
        Ok(None)
    }

    async fn close(&mut self) -> Result<()> {
        self.open = false;
        tracing::debug!("mock source closed");
        Ok(())
    }
}

/// One recorded publish
#[derive(Debug, Clone)]
pub struct PublishedMessage {
    /// Topic the message was published to
    pub topic: String,
    /// The message as the publisher received it
    pub message: Message,
}

/// Shared view of everything a [`MockPublisher`] has recorded
#[derive(Debug, Clone, Default)]
pub struct PublishLog {
    records: Arc<Mutex<Vec<PublishedMessage>>>,
}

impl PublishLog {
    /// Number of recorded publishes
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether nothing has been published yet
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Copy of every recorded publish, in publish order
    pub fn records(&self) -> Vec<PublishedMessage> {
        self.records.lock().clone()
    }

    /// Messages published to one topic, in publish order
    pub fn for_topic(&self, topic: &str) -> Vec<Message> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.topic == topic)
            .map(|r| r.message.clone())
            .collect()
    }

    fn record(&self, topic: &str, message: Message) {
        self.records.lock().push(PublishedMessage {
            topic: topic.to_owned(),
            message,
        });
    }
}

/// Shared handle for scripting publish failures
///
/// Each queued error fails exactly one subsequent `publish` call.
#[derive(Debug, Clone, Default)]
pub struct FaultQueue {
    faults: Arc<Mutex<VecDeque<AdapterError>>>,
}

impl FaultQueue {
    /// Queue an error for the next publish
    pub fn push(&self, error: AdapterError) {
        self.faults.lock().push_back(error);
    }

    /// Whether any faults remain queued
    pub fn is_empty(&self) -> bool {
        self.faults.lock().is_empty()
    }

    fn pop(&self) -> Option<AdapterError> {
        self.faults.lock().pop_front()
    }
}

/// In-memory message publisher
///
/// # Example
///
/// ```
/// use shunt_adapters::mock::MockPublisher;
///
/// let publisher = MockPublisher::new();
/// let log = publisher.log();
/// assert!(log.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct MockPublisher {
    open: AtomicBool,
    delay: Option<Duration>,
    log: PublishLog,
    faults: FaultQueue,
}

impl MockPublisher {
    /// Create a publisher that records instantly
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a publisher that sleeps `delay` per publish
    ///
    /// Used to simulate a slow broker for back-pressure tests.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Build from a config parameter table
    ///
    /// Recognized parameters: `delay` (milliseconds per publish, default
    /// none).
    pub fn from_params(params: &toml::Table) -> Result<Self> {
        let delay = match params.get("delay") {
            None => None,
            Some(value) => {
                let ms = value.as_integer().filter(|ms| *ms >= 0).ok_or_else(|| {
                    AdapterError::invalid_param("delay", "must be a non-negative integer (ms)")
                })?;
                Some(Duration::from_millis(ms as u64))
            }
        };
        Ok(Self {
            delay,
            ..Self::default()
        })
    }

    /// Get a handle over everything published
    pub fn log(&self) -> PublishLog {
        self.log.clone()
    }

    /// Get a handle for scripting publish failures
    pub fn faults(&self) -> FaultQueue {
        self.faults.clone()
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    async fn open(&mut self) -> Result<()> {
        self.open.store(true, Ordering::Release);
        tracing::debug!("mock publisher opened");
        Ok(())
    }

    async fn publish(&self, topic: &str, message: &Message) -> Result<()> {
        if !self.open.load(Ordering::Acquire) {
            return Err(AdapterError::transient_on(topic, "mock publisher is not open"));
        }
        if let Some(error) = self.faults.pop() {
            return Err(error);
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.log.record(topic, message.clone());
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.open.store(false, Ordering::Release);
        tracing::debug!(published = self.log.len(), "mock publisher closed");
        Ok(())
    }
}
