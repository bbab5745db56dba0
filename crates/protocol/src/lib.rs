//! Shunt - Protocol
//!
//! The `Message` record that flows through the bridge, from source adapter
//! through the domain stage to the publisher adapter.
//!
//! # Design
//!
//! - **Cheap to move**: payloads use `bytes::Bytes`, so cloning a message
//!   shares the underlying buffer instead of copying it
//! - **Immutable after emission**: once a source emits a message, only a
//!   domain processor may replace it (or extend its headers); the flow
//!   itself only fills in the destination topic
//! - **Opaque metadata**: broker-native identifiers (partition, offset,
//!   delivery tag) ride along untouched for ack correlation downstream

mod message;

pub use message::{Message, MetadataValue};

#[cfg(test)]
mod message_test;
