//! Thread-safe per-topic metrics collection

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::RwLock;
use serde::Serialize;

/// Guard against division by a zero-length uptime on early snapshots
const MIN_UPTIME_SECS: f64 = 1e-9;

/// Counters for a single topic on one side of the flow
///
/// All operations use relaxed ordering; values may be slightly stale when
/// read but are never torn.
#[derive(Debug, Default)]
pub struct TopicMetrics {
    /// Messages recorded for this topic
    message_count: AtomicU64,

    /// Payload bytes recorded for this topic
    total_bytes: AtomicU64,

    /// Per-message errors attributed to this topic
    error_count: AtomicU64,

    /// Epoch milliseconds of the last recorded message (last-writer-wins)
    last_message_ms: AtomicU64,
}

impl TopicMetrics {
    /// Create a new counter set with everything at zero
    pub const fn new() -> Self {
        Self {
            message_count: AtomicU64::new(0),
            total_bytes: AtomicU64::new(0),
            error_count: AtomicU64::new(0),
            last_message_ms: AtomicU64::new(0),
        }
    }

    /// Record one message of the given payload size
    #[inline]
    pub fn record_message(&self, bytes: u64) {
        self.message_count.fetch_add(1, Ordering::Relaxed);
        self.total_bytes.fetch_add(bytes, Ordering::Relaxed);
        self.last_message_ms
            .store(now_epoch_ms(), Ordering::Relaxed);
    }

    /// Record one error
    #[inline]
    pub fn record_error(&self) {
        self.error_count.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self, uptime_secs: f64) -> TopicSnapshot {
        let message_count = self.message_count.load(Ordering::Relaxed);
        let last_ms = self.last_message_ms.load(Ordering::Relaxed);
        TopicSnapshot {
            message_count,
            total_bytes: self.total_bytes.load(Ordering::Relaxed),
            error_count: self.error_count.load(Ordering::Relaxed),
            last_message_time: (last_ms > 0)
                .then(|| Utc.timestamp_millis_opt(last_ms as i64).single())
                .flatten(),
            rate_per_second: message_count as f64 / uptime_secs.max(MIN_UPTIME_SECS),
        }
    }
}

/// Point-in-time copy of one topic's counters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicSnapshot {
    /// Messages recorded
    pub message_count: u64,
    /// Payload bytes recorded
    pub total_bytes: u64,
    /// Errors attributed
    pub error_count: u64,
    /// When the last message was recorded, if any
    pub last_message_time: Option<DateTime<Utc>>,
    /// Messages per second over the collector's lifetime
    pub rate_per_second: f64,
}

/// Point-in-time copy of everything the collector knows
#[derive(Debug, Clone, Serialize)]
pub struct FlowSnapshot {
    /// Seconds since the collector was created
    pub uptime_seconds: f64,
    /// Messages intentionally dropped by the processor
    pub filtered_count: u64,
    /// Times the domain-queue throttle gate engaged
    ///
    /// The gates live with the flow's queues, not the collector; the flow
    /// overlays both counts via [`FlowSnapshot::with_throttle_engagements`]
    /// when it produces the report snapshot.
    pub domain_throttle_engagements: u64,
    /// Times the publish-queue throttle gate engaged
    pub publish_throttle_engagements: u64,
    /// Source-side topics
    pub source: BTreeMap<String, TopicSnapshot>,
    /// Destination-side topics
    pub destination: BTreeMap<String, TopicSnapshot>,
}

impl FlowSnapshot {
    /// Overlay the throttle-gate engagement counts
    #[must_use]
    pub fn with_throttle_engagements(mut self, domain: u64, publish: u64) -> Self {
        self.domain_throttle_engagements = domain;
        self.publish_throttle_engagements = publish;
        self
    }

    /// Total messages recorded on the source side
    pub fn source_total(&self) -> u64 {
        self.source.values().map(|t| t.message_count).sum()
    }

    /// Total messages recorded on the destination side
    pub fn destination_total(&self) -> u64 {
        self.destination.values().map(|t| t.message_count).sum()
    }

    /// Total errors across both sides
    pub fn error_total(&self) -> u64 {
        self.source
            .values()
            .chain(self.destination.values())
            .map(|t| t.error_count)
            .sum()
    }
}

/// Thread-safe metrics collector, partitioned by topic per side
///
/// Many writers (consumer tasks and both worker pools), occasional reader
/// (the final report and tests).
#[derive(Debug)]
pub struct MetricsCollector {
    started: Instant,
    filtered: AtomicU64,
    source: RwLock<HashMap<String, Arc<TopicMetrics>>>,
    destination: RwLock<HashMap<String, Arc<TopicMetrics>>>,
}

impl MetricsCollector {
    /// Create a collector; the uptime clock starts now
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            filtered: AtomicU64::new(0),
            source: RwLock::new(HashMap::new()),
            destination: RwLock::new(HashMap::new()),
        }
    }

    /// Record a message consumed from a source topic
    #[inline]
    pub fn record_source(&self, topic: &str, bytes: u64) {
        Self::topic(&self.source, topic).record_message(bytes);
    }

    /// Record a message delivered to a destination topic
    #[inline]
    pub fn record_destination(&self, topic: &str, bytes: u64) {
        Self::topic(&self.destination, topic).record_message(bytes);
    }

    /// Record an error attributed to a source topic
    #[inline]
    pub fn record_source_error(&self, topic: &str) {
        Self::topic(&self.source, topic).record_error();
    }

    /// Record an error attributed to a destination topic
    #[inline]
    pub fn record_destination_error(&self, topic: &str) {
        Self::topic(&self.destination, topic).record_error();
    }

    /// Record a message the processor intentionally dropped
    #[inline]
    pub fn record_filtered(&self) {
        self.filtered.fetch_add(1, Ordering::Relaxed);
    }

    /// Messages intentionally dropped so far
    #[inline]
    pub fn filtered_count(&self) -> u64 {
        self.filtered.load(Ordering::Relaxed)
    }

    /// Get a deep-copied snapshot of both sides
    ///
    /// The throttle-gate engagement counts start at zero here; the flow
    /// overlays them before the snapshot is rendered.
    pub fn snapshot(&self) -> FlowSnapshot {
        let uptime = self.started.elapsed().as_secs_f64();
        FlowSnapshot {
            uptime_seconds: uptime,
            filtered_count: self.filtered.load(Ordering::Relaxed),
            domain_throttle_engagements: 0,
            publish_throttle_engagements: 0,
            source: Self::side_snapshot(&self.source, uptime),
            destination: Self::side_snapshot(&self.destination, uptime),
        }
    }

    /// Fetch or create the counter set for a topic
    ///
    /// Read-lock fast path; the write lock is only taken the first time a
    /// topic is seen.
    fn topic(
        side: &RwLock<HashMap<String, Arc<TopicMetrics>>>,
        topic: &str,
    ) -> Arc<TopicMetrics> {
        if let Some(metrics) = side.read().get(topic) {
            return Arc::clone(metrics);
        }
        let mut map = side.write();
        Arc::clone(
            map.entry(topic.to_owned())
                .or_insert_with(|| Arc::new(TopicMetrics::new())),
        )
    }

    fn side_snapshot(
        side: &RwLock<HashMap<String, Arc<TopicMetrics>>>,
        uptime_secs: f64,
    ) -> BTreeMap<String, TopicSnapshot> {
        side.read()
            .iter()
            .map(|(topic, metrics)| (topic.clone(), metrics.snapshot(uptime_secs)))
            .collect()
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Current epoch milliseconds
#[inline]
fn now_epoch_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
