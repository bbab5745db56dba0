//! Shunt - Flow
//!
//! The three-stage pipeline that moves messages from source adapters
//! through the domain stage to a publisher adapter.
//!
//! # Architecture
//!
//! ```text
//! [Sources]                [Domain]                  [Publish]
//!   mock ──┐
//!   mock ──┼─► BoundedQueue ─► worker pool ─► BoundedQueue ─► worker pool ─► Publisher
//!   mock ──┘        │         (processor +        │
//!                   │          routing)           │
//!             back-pressure                 back-pressure
//!                 gate                          gate
//! ```
//!
//! # Key Design
//!
//! - **Blocking bounded queues**: both inter-stage queues block producers
//!   when full; that is the hard back-pressure propagation point
//! - **Cooperative throttle gates**: a hysteresis gate per queue lets
//!   consumers slow their fetch rate before the queue ever fills, so
//!   adapter-level batching can drain between fetches
//! - **Error isolation**: any per-message failure (processing, routing,
//!   publishing) costs exactly that message; workers never die from one
//! - **Single flow struct**: the funnel / fan / one-to-one topologies
//!   differ only in their `RoutePolicy`, not in the machinery
//! - **Bounded shutdown**: every blocking call polls on a 100 ms timeout,
//!   and the whole drain shares one deadline; workers that overrun it are
//!   abandoned with a warning rather than wedging the process

mod back_pressure;
mod error;
mod flow;
mod queue;
mod worker;

pub use back_pressure::BackPressure;
pub use error::FlowError;
pub use flow::{BackPressureSettings, Flow, FlowSettings, FlowState, StopReport};
pub use queue::{BoundedQueue, QueueClosed, Recv};
pub use worker::{ShutdownOutcome, WorkerPool};

use std::time::Duration;

/// Poll timeout for every blocking call inside a worker loop
///
/// Keeps the running flag checked promptly during shutdown.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long a throttled task sleeps before re-checking its gate
pub const THROTTLE_PAUSE: Duration = Duration::from_millis(10);
