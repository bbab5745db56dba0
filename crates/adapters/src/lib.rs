//! Shunt - Adapters
//!
//! The broker-client seam of the bridge: the `Source` and `Publisher`
//! contracts the flow engine consumes, the error taxonomy adapters report
//! through, and a string-keyed registry that turns configuration into
//! adapter instances.
//!
//! # Design
//!
//! - **Contracts, not clients**: real broker clients (Kafka, Pulsar, ...)
//!   live behind the registry; the engine only ever sees `Box<dyn Source>`
//!   and `Box<dyn Publisher>`
//! - **Single-consumer, multi-publisher**: `consume` is called from exactly
//!   one task per source; `publish` from many tasks concurrently, so
//!   publishers must be `Sync`
//! - **Typed failure severity**: `Transient` errors cost one message,
//!   `Fatal` errors take the whole flow down through its drain protocol
//!
//! The bundled `mock` adapter backs tests, demos, and local development.

mod contract;
mod error;
pub mod mock;
mod registry;

pub use contract::{Publisher, Source};
pub use error::{AdapterError, Result};
pub use registry::AdapterRegistry;
