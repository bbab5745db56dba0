//! Adapter registry - configuration-driven adapter creation
//!
//! Maps adapter type names (the `type` field of a broker config block) to
//! factory functions. Real broker clients register themselves here; the
//! `mock` adapter is registered by default.

use std::collections::HashMap;

use crate::mock::{MockPublisher, MockSource};
use crate::{AdapterError, Publisher, Result, Source};

/// Factory signature for sources
pub type SourceFactory = Box<dyn Fn(&toml::Table) -> Result<Box<dyn Source>> + Send + Sync>;

/// Factory signature for publishers
pub type PublisherFactory = Box<dyn Fn(&toml::Table) -> Result<Box<dyn Publisher>> + Send + Sync>;

/// String-keyed factories for sources and publishers
///
/// # Example
///
/// ```
/// use shunt_adapters::AdapterRegistry;
///
/// let registry = AdapterRegistry::with_builtins();
/// let source = registry.create_source("mock", &toml::Table::new()).unwrap();
/// drop(source);
/// assert!(registry.create_source("kafka", &toml::Table::new()).is_err());
/// ```
pub struct AdapterRegistry {
    sources: HashMap<String, SourceFactory>,
    publishers: HashMap<String, PublisherFactory>,
}

impl AdapterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            sources: HashMap::new(),
            publishers: HashMap::new(),
        }
    }

    /// Create a registry with the bundled adapters registered
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_source("mock", |params| {
            Ok(Box::new(MockSource::from_params(params)?) as Box<dyn Source>)
        });
        registry.register_publisher("mock", |params| {
            Ok(Box::new(MockPublisher::from_params(params)?) as Box<dyn Publisher>)
        });
        registry
    }

    /// Register a source factory under a type name
    ///
    /// Replaces any factory previously registered under the same name.
    pub fn register_source<F>(&mut self, kind: &str, factory: F)
    where
        F: Fn(&toml::Table) -> Result<Box<dyn Source>> + Send + Sync + 'static,
    {
        self.sources.insert(kind.to_owned(), Box::new(factory));
    }

    /// Register a publisher factory under a type name
    pub fn register_publisher<F>(&mut self, kind: &str, factory: F)
    where
        F: Fn(&toml::Table) -> Result<Box<dyn Publisher>> + Send + Sync + 'static,
    {
        self.publishers.insert(kind.to_owned(), Box::new(factory));
    }

    /// Create a source of the given type
    ///
    /// # Errors
    ///
    /// `UnknownKind` if no factory is registered; factory errors pass
    /// through.
    pub fn create_source(&self, kind: &str, params: &toml::Table) -> Result<Box<dyn Source>> {
        let factory = self.sources.get(kind).ok_or_else(|| {
            AdapterError::UnknownKind {
                kind: kind.to_owned(),
                available: Self::known(&self.sources),
            }
        })?;
        factory(params)
    }

    /// Create a publisher of the given type
    pub fn create_publisher(&self, kind: &str, params: &toml::Table) -> Result<Box<dyn Publisher>> {
        let factory = self.publishers.get(kind).ok_or_else(|| {
            AdapterError::UnknownKind {
                kind: kind.to_owned(),
                available: Self::known(&self.publishers),
            }
        })?;
        factory(params)
    }

    /// Registered source type names
    pub fn source_kinds(&self) -> Vec<&str> {
        self.sources.keys().map(String::as_str).collect()
    }

    /// Registered publisher type names
    pub fn publisher_kinds(&self) -> Vec<&str> {
        self.publishers.keys().map(String::as_str).collect()
    }

    fn known<V>(map: &HashMap<String, V>) -> String {
        let mut kinds: Vec<&str> = map.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds.join(", ")
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
