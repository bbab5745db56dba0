//! Shunt - Routing
//!
//! Destination-topic selection for the three bridge topologies.
//!
//! - **Funnel**: every message goes to one fixed topic
//! - **Fan**: the destination is resolved per message from a header or a
//!   JSON payload key
//! - **One-to-one**: a pre-compiled `source_topic -> destination_topic`
//!   table, built once from configuration
//!
//! All selection is pure: a failed resolution surfaces as a `RouteError`
//! and the caller decides what to do with the message (the flow counts it
//! against the source topic and drops it).

mod error;
mod policy;
mod resolver;
mod topic_map;

pub use error::{Result, RouteError};
pub use policy::RoutePolicy;
pub use resolver::DestinationResolver;
pub use topic_map::TopicMap;

#[cfg(test)]
mod resolver_test;
