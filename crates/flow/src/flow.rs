//! The flow engine: wiring, worker loops, and lifecycle
//!
//! A `Flow` is one running topology wired end-to-end. The funnel, fan, and
//! one-to-one modes share all of the machinery here and differ only in the
//! `RoutePolicy` chosen at construction.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use shunt_adapters::{Publisher, Source};
use shunt_metrics::{FlowSnapshot, MetricsCollector};
use shunt_processor::Processor;
use shunt_protocol::Message;
use shunt_routing::{DestinationResolver, RoutePolicy, TopicMap};

use crate::{
    BackPressure, BoundedQueue, FlowError, Recv, ShutdownOutcome, WorkerPool, POLL_INTERVAL,
    THROTTLE_PAUSE,
};

/// Lifecycle state of a flow
///
/// Monotonic: `Created -> Starting -> Running -> Draining -> Stopped`,
/// with `Failed` as the terminal alternative from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    /// Constructed, nothing opened yet
    Created,
    /// Opening adapters and spawning workers
    Starting,
    /// Moving messages
    Running,
    /// Stop requested; queues draining
    Draining,
    /// Drained and closed
    Stopped,
    /// An unrecoverable error ended the flow
    Failed,
}

/// Watermark settings for the throttle gates
#[derive(Debug, Clone, Copy)]
pub struct BackPressureSettings {
    /// Whether the gates throttle at all
    pub enabled: bool,
    /// Fill fraction that engages a gate
    pub high_watermark: f64,
    /// Fill fraction that releases it
    pub low_watermark: f64,
}

impl Default for BackPressureSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            high_watermark: 0.8,
            low_watermark: 0.5,
        }
    }
}

/// Sizing and shutdown settings for a flow
#[derive(Debug, Clone)]
pub struct FlowSettings {
    /// Workers per stage pool
    pub max_workers: usize,

    /// Capacity of each inter-stage queue
    pub queue_size: usize,

    /// Throttle gate watermarks
    pub back_pressure: BackPressureSettings,

    /// Total drain budget for `stop()`
    pub shutdown_timeout: Duration,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            max_workers: 20,
            queue_size: 2000,
            back_pressure: BackPressureSettings::default(),
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

/// Result of a `stop()` call
#[derive(Debug, Clone, Copy)]
pub struct StopReport {
    /// Terminal state the flow reached
    pub state: FlowState,
    /// Whether every worker drained within the budget
    pub clean: bool,
}

impl StopReport {
    /// Whether this was a fully clean shutdown
    #[inline]
    pub fn is_clean_stop(&self) -> bool {
        self.clean && self.state == FlowState::Stopped
    }
}

/// State shared between the flow handle and its worker tasks
struct Shared {
    domain_queue: BoundedQueue<Message>,
    publish_queue: BoundedQueue<Message>,
    domain_gate: BackPressure,
    publish_gate: BackPressure,
    cancel: CancellationToken,
    fatal: AtomicBool,
    metrics: Arc<MetricsCollector>,
}

impl Shared {
    /// Mark the flow failed and ask everything to wind down
    fn fail(&self) {
        if !self.fatal.swap(true, Ordering::SeqCst) {
            tracing::error!("fatal adapter error, initiating shutdown");
        }
        self.cancel.cancel();
    }
}

/// Adapters held between construction and `start()`
struct Wiring {
    sources: Vec<(Box<dyn Source>, Vec<String>)>,
    publisher: Box<dyn Publisher>,
}

struct Pools {
    consumers: WorkerPool,
    domain: WorkerPool,
    publish: WorkerPool,
}

/// One running topology, wired end-to-end
///
/// ```text
/// sources -> domain_queue -> domain workers -> publish_queue -> publish workers -> publisher
/// ```
///
/// The flow exclusively owns its queues, pools, sources, publisher, and
/// processor; whoever constructs it owns the flow.
pub struct Flow {
    settings: FlowSettings,
    policy: Arc<RoutePolicy>,
    processor: Arc<dyn Processor>,
    shared: Arc<Shared>,
    state: Mutex<FlowState>,
    wiring: Option<Wiring>,
    publisher: Option<Arc<dyn Publisher>>,
    pools: Option<Pools>,
}

impl Flow {
    /// Funnel: many sources, one fixed destination topic
    pub fn funnel(
        sources: Vec<(Box<dyn Source>, Vec<String>)>,
        publisher: Box<dyn Publisher>,
        destination_topic: impl Into<String>,
        processor: Arc<dyn Processor>,
        settings: FlowSettings,
    ) -> Self {
        Self::build(
            RoutePolicy::Fixed(destination_topic.into()),
            sources,
            publisher,
            processor,
            settings,
        )
    }

    /// Fan: one source topic, destinations resolved per message
    pub fn fan(
        source: Box<dyn Source>,
        source_topic: impl Into<String>,
        publisher: Box<dyn Publisher>,
        resolver: DestinationResolver,
        processor: Arc<dyn Processor>,
        settings: FlowSettings,
    ) -> Self {
        Self::build(
            RoutePolicy::Resolve(resolver),
            vec![(source, vec![source_topic.into()])],
            publisher,
            processor,
            settings,
        )
    }

    /// One-to-one: destination looked up per source topic
    ///
    /// The source subscribes to the map's source topics.
    pub fn one_to_one(
        source: Box<dyn Source>,
        publisher: Box<dyn Publisher>,
        map: TopicMap,
        processor: Arc<dyn Processor>,
        settings: FlowSettings,
    ) -> Self {
        let mut topics = map.source_topics();
        topics.sort_unstable();
        Self::build(
            RoutePolicy::Mapped(map),
            vec![(source, topics)],
            publisher,
            processor,
            settings,
        )
    }

    fn build(
        policy: RoutePolicy,
        sources: Vec<(Box<dyn Source>, Vec<String>)>,
        publisher: Box<dyn Publisher>,
        processor: Arc<dyn Processor>,
        settings: FlowSettings,
    ) -> Self {
        let bp = settings.back_pressure;
        Self {
            shared: Arc::new(Shared {
                domain_queue: BoundedQueue::new(settings.queue_size),
                publish_queue: BoundedQueue::new(settings.queue_size),
                domain_gate: BackPressure::new(
                    settings.queue_size,
                    bp.high_watermark,
                    bp.low_watermark,
                    bp.enabled,
                ),
                publish_gate: BackPressure::new(
                    settings.queue_size,
                    bp.high_watermark,
                    bp.low_watermark,
                    bp.enabled,
                ),
                cancel: CancellationToken::new(),
                fatal: AtomicBool::new(false),
                metrics: Arc::new(MetricsCollector::new()),
            }),
            policy: Arc::new(policy),
            processor,
            settings,
            state: Mutex::new(FlowState::Created),
            wiring: Some(Wiring { sources, publisher }),
            publisher: None,
            pools: None,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> FlowState {
        *self.state.lock()
    }

    /// The flow's metrics collector
    pub fn metrics(&self) -> Arc<MetricsCollector> {
        Arc::clone(&self.shared.metrics)
    }

    /// Point-in-time report snapshot
    ///
    /// The collector's per-topic counters plus both throttle gates'
    /// engagement counts; this is what the final report renders.
    pub fn snapshot(&self) -> FlowSnapshot {
        self.shared.metrics.snapshot().with_throttle_engagements(
            self.shared.domain_gate.engage_count(),
            self.shared.publish_gate.engage_count(),
        )
    }

    /// Times either throttle gate engaged (domain + publish)
    pub fn back_pressure_engagements(&self) -> u64 {
        self.shared.domain_gate.engage_count() + self.shared.publish_gate.engage_count()
    }

    /// Completes once the flow has asked to shut down (fatal error or
    /// an external `stop()`)
    pub async fn until_shutdown_requested(&self) {
        self.shared.cancel.cancelled().await;
    }

    /// Open adapters, spawn the pipeline, and transition to `Running`
    ///
    /// # Errors
    ///
    /// Adapter open/subscribe failures transition the flow to `Failed`
    /// after unwinding whatever had already been opened, in reverse order.
    pub async fn start(&mut self) -> Result<(), FlowError> {
        self.transition(FlowState::Created, FlowState::Starting)?;
        let Some(Wiring {
            sources,
            mut publisher,
        }) = self.wiring.take()
        else {
            return Err(FlowError::InvalidState {
                expected: FlowState::Created,
                actual: FlowState::Starting,
            });
        };

        tracing::info!(
            mode = self.policy.mode(),
            sources = sources.len(),
            workers = self.settings.max_workers,
            queue_size = self.settings.queue_size,
            "starting flow"
        );

        if let Err(error) = publisher.open().await {
            self.set_state(FlowState::Failed);
            return Err(FlowError::OpenPublisher(error));
        }

        let mut opened: Vec<(Box<dyn Source>, Vec<String>)> = Vec::with_capacity(sources.len());
        for (mut source, topics) in sources {
            let result = match source.open().await {
                Ok(()) => source.subscribe(&topics).await,
                Err(error) => Err(error),
            };
            match result {
                Ok(()) => opened.push((source, topics)),
                Err(error) => {
                    let label = topics.first().cloned().unwrap_or_default();
                    self.unwind(opened, publisher).await;
                    self.set_state(FlowState::Failed);
                    return Err(FlowError::OpenSource {
                        label,
                        source: error,
                    });
                }
            }
        }

        let publisher: Arc<dyn Publisher> = Arc::from(publisher);
        self.publisher = Some(Arc::clone(&publisher));

        // Downstream stages first, so nothing consumed ever waits on a
        // pool that does not exist yet
        let publish = WorkerPool::spawn("publish", self.settings.max_workers, |index| {
            publish_loop(index, Arc::clone(&self.shared), Arc::clone(&publisher))
        });
        let domain = WorkerPool::spawn("domain", self.settings.max_workers, |index| {
            domain_loop(
                index,
                Arc::clone(&self.shared),
                Arc::clone(&self.processor),
                Arc::clone(&self.policy),
            )
        });

        let consumer_count = opened.len();
        let mut slots: VecDeque<(Box<dyn Source>, Vec<String>)> = opened.into_iter().collect();
        let shared = Arc::clone(&self.shared);
        let consumers = WorkerPool::spawn("consumer", consumer_count, move |index| {
            let slot = slots.pop_front();
            let shared = Arc::clone(&shared);
            async move {
                if let Some((source, topics)) = slot {
                    consumer_loop(index, source, topics, shared).await;
                }
            }
        });

        self.pools = Some(Pools {
            consumers,
            domain,
            publish,
        });
        self.set_state(FlowState::Running);
        tracing::info!("flow running");
        Ok(())
    }

    /// Drain and stop the flow within its shutdown budget
    ///
    /// Protocol: stop consumers, close the domain queue, drain the domain
    /// pool, close the publish queue, drain the publish pool, close the
    /// publisher. All phases share one deadline; overruns abandon the
    /// stragglers and mark the report unclean.
    pub async fn stop(&mut self) -> StopReport {
        {
            let mut state = self.state.lock();
            match *state {
                FlowState::Running | FlowState::Starting => *state = FlowState::Draining,
                current => {
                    return StopReport {
                        state: current,
                        clean: current == FlowState::Stopped,
                    }
                }
            }
        }
        tracing::info!(
            budget_secs = self.settings.shutdown_timeout.as_secs_f64(),
            "draining flow"
        );

        let deadline = tokio::time::Instant::now() + self.settings.shutdown_timeout;
        self.shared.cancel.cancel();

        let mut clean = true;
        if let Some(pools) = self.pools.take() {
            clean &= drained(pools.consumers.shutdown(true, remaining(deadline)).await);
            self.shared.domain_queue.close();
            clean &= drained(pools.domain.shutdown(true, remaining(deadline)).await);
            self.shared.publish_queue.close();
            clean &= drained(pools.publish.shutdown(true, remaining(deadline)).await);
        }

        if let Some(publisher) = self.publisher.take() {
            match tokio::time::timeout_at(deadline, publisher.close()).await {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    tracing::warn!(error = %error, "error closing publisher");
                    clean = false;
                }
                Err(_) => {
                    tracing::warn!("publisher close exceeded the shutdown budget");
                    clean = false;
                }
            }
        }

        let state = if self.shared.fatal.load(Ordering::SeqCst) {
            FlowState::Failed
        } else {
            FlowState::Stopped
        };
        self.set_state(state);

        let snapshot = self.snapshot();
        tracing::info!(
            state = ?state,
            clean,
            consumed = snapshot.source_total(),
            delivered = snapshot.destination_total(),
            filtered = snapshot.filtered_count,
            errors = snapshot.error_total(),
            domain_throttle = snapshot.domain_throttle_engagements,
            publish_throttle = snapshot.publish_throttle_engagements,
            "flow stopped"
        );
        StopReport { state, clean }
    }

    /// Close partially-opened adapters after a setup failure
    async fn unwind(
        &self,
        opened: Vec<(Box<dyn Source>, Vec<String>)>,
        publisher: Box<dyn Publisher>,
    ) {
        for (mut source, topics) in opened.into_iter().rev() {
            if let Err(error) = source.close().await {
                tracing::warn!(topics = ?topics, error = %error, "error closing source during unwind");
            }
        }
        if let Err(error) = publisher.close().await {
            tracing::warn!(error = %error, "error closing publisher during unwind");
        }
    }

    fn transition(&self, expected: FlowState, to: FlowState) -> Result<(), FlowError> {
        let mut state = self.state.lock();
        if *state != expected {
            return Err(FlowError::InvalidState {
                expected,
                actual: *state,
            });
        }
        *state = to;
        Ok(())
    }

    fn set_state(&self, to: FlowState) {
        *self.state.lock() = to;
    }
}

impl std::fmt::Debug for Flow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Flow")
            .field("mode", &self.policy.mode())
            .field("state", &self.state())
            .finish()
    }
}

fn drained(outcome: ShutdownOutcome) -> bool {
    outcome.is_drained()
}

fn remaining(deadline: tokio::time::Instant) -> Duration {
    deadline.saturating_duration_since(tokio::time::Instant::now())
}

/// Per-source consumer task
///
/// Owns its source for the task's lifetime and closes it on the way out.
async fn consumer_loop(
    index: usize,
    mut source: Box<dyn Source>,
    topics: Vec<String>,
    shared: Arc<Shared>,
) {
    let label = topics
        .first()
        .cloned()
        .unwrap_or_else(|| format!("consumer-{index}"));
    tracing::debug!(consumer = index, topics = ?topics, "consumer started");

    while !shared.cancel.is_cancelled() {
        // Throttle while the domain queue sits above its high watermark
        while shared.domain_gate.observe(shared.domain_queue.len()) {
            if shared.cancel.is_cancelled() {
                break;
            }
            tokio::time::sleep(THROTTLE_PAUSE).await;
        }
        if shared.cancel.is_cancelled() {
            break;
        }

        match source.consume(POLL_INTERVAL).await {
            Ok(Some(message)) => {
                shared
                    .metrics
                    .record_source(message.source_topic(), message.payload_len() as u64);
                if shared.domain_queue.put(message).await.is_err() {
                    break;
                }
            }
            Ok(None) => {}
            Err(error) if error.is_fatal() => {
                tracing::error!(consumer = index, error = %error, "fatal source error");
                shared
                    .metrics
                    .record_source_error(error.topic().unwrap_or(&label));
                shared.fail();
                break;
            }
            Err(error) => {
                tracing::warn!(consumer = index, error = %error, "transient source error");
                shared
                    .metrics
                    .record_source_error(error.topic().unwrap_or(&label));
            }
        }
    }

    if let Err(error) = source.close().await {
        tracing::warn!(consumer = index, error = %error, "error closing source");
    }
    tracing::debug!(consumer = index, "consumer stopped");
}

/// Domain worker: process, pick a destination, hand off to publish
async fn domain_loop(
    index: usize,
    shared: Arc<Shared>,
    processor: Arc<dyn Processor>,
    policy: Arc<RoutePolicy>,
) {
    loop {
        let message = match shared.domain_queue.get(POLL_INTERVAL).await {
            Recv::Item(message) => message,
            Recv::TimedOut => continue,
            Recv::Closed => break,
        };
        let source_topic = message.source_topic().to_owned();

        let mut processed = match processor.process(message).await {
            Ok(Some(message)) => message,
            Ok(None) => {
                shared.metrics.record_filtered();
                continue;
            }
            Err(error) => {
                tracing::warn!(worker = index, topic = %source_topic, error = %error, "processor error");
                shared.metrics.record_source_error(&source_topic);
                continue;
            }
        };

        let destination = match policy.destination_for(&processed) {
            Ok(topic) => topic,
            Err(error) => {
                tracing::warn!(worker = index, topic = %source_topic, error = %error, "routing error");
                shared.metrics.record_source_error(&source_topic);
                continue;
            }
        };
        processed.set_destination_topic(destination);

        // Ease off before the blocking put when the publish side is deep
        while shared.publish_gate.observe(shared.publish_queue.len()) {
            if shared.cancel.is_cancelled() {
                break;
            }
            tokio::time::sleep(THROTTLE_PAUSE).await;
        }
        if shared.publish_queue.put(processed).await.is_err() {
            tracing::warn!(worker = index, "publish queue closed with a message in flight");
            break;
        }
    }
    tracing::debug!(worker = index, "domain worker stopped");
}

/// Publish worker: deliver and account
async fn publish_loop(index: usize, shared: Arc<Shared>, publisher: Arc<dyn Publisher>) {
    loop {
        let message = match shared.publish_queue.get(POLL_INTERVAL).await {
            Recv::Item(message) => message,
            Recv::TimedOut => continue,
            Recv::Closed => break,
        };

        let Some(topic) = message.destination_topic().map(str::to_owned) else {
            tracing::error!(worker = index, "message reached the publish stage without a destination");
            shared
                .metrics
                .record_destination_error(message.source_topic());
            continue;
        };

        match publisher.publish(&topic, &message).await {
            Ok(()) => {
                shared
                    .metrics
                    .record_destination(&topic, message.payload_len() as u64);
            }
            Err(error) if error.is_fatal() => {
                tracing::error!(worker = index, topic = %topic, error = %error, "fatal publish error");
                shared.metrics.record_destination_error(&topic);
                shared.fail();
            }
            Err(error) => {
                tracing::warn!(worker = index, topic = %topic, error = %error, "publish failed");
                shared.metrics.record_destination_error(&topic);
            }
        }
    }
    tracing::debug!(worker = index, "publish worker stopped");
}
