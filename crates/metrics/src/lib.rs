//! Shunt - Metrics
//!
//! Per-topic counters for both sides of a flow.
//!
//! # Design
//!
//! - **Partitioned by topic per side**: one `TopicMetrics` per source topic
//!   and one per destination topic, created on first touch
//! - **Atomic counters, relaxed ordering**: writers never contend beyond
//!   the brief read-lock on the topic map; values are eventually
//!   consistent, not real-time
//! - **Copy-on-read snapshots**: `snapshot()` deep-copies everything so the
//!   (rare) reader never observes a partially updated topic
//!
//! The `format` module renders a snapshot for the final report printed at
//! shutdown, in human or JSON form.

mod collector;
pub mod format;

pub use collector::{FlowSnapshot, MetricsCollector, TopicMetrics, TopicSnapshot};

#[cfg(test)]
mod collector_test;
