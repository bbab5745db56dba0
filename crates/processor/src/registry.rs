//! Processor registry - name-driven processor creation
//!
//! Configuration references a processor by name; the registry maps names
//! to factory functions so a compiled binary exposes a fixed, registered
//! set instead of loading code dynamically.

use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    HeaderStampProcessor, IdentityProcessor, PriorityFilterProcessor, Processor, ProcessorError,
    Result,
};

/// Name of the processor used when configuration does not specify one
pub const DEFAULT_PROCESSOR: &str = "identity";

/// Factory signature for processors
pub type ProcessorFactory = Box<dyn Fn(&toml::Table) -> Result<Arc<dyn Processor>> + Send + Sync>;

/// Name-keyed processor factories
///
/// # Example
///
/// ```
/// use shunt_processor::ProcessorRegistry;
///
/// let registry = ProcessorRegistry::with_builtins();
/// let processor = registry.create("identity", &toml::Table::new()).unwrap();
/// assert_eq!(processor.name(), "identity");
/// ```
pub struct ProcessorRegistry {
    factories: HashMap<String, ProcessorFactory>,
}

impl ProcessorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry with the built-in processors registered
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(DEFAULT_PROCESSOR, |_| {
            Ok(Arc::new(IdentityProcessor::new()) as Arc<dyn Processor>)
        });
        registry.register("header_stamp", |_| {
            Ok(Arc::new(HeaderStampProcessor::new()) as Arc<dyn Processor>)
        });
        registry.register("priority_filter", |params| {
            Ok(Arc::new(PriorityFilterProcessor::from_params(params)?) as Arc<dyn Processor>)
        });
        registry
    }

    /// Register a processor factory under a name
    ///
    /// Replaces any factory previously registered under the same name.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&toml::Table) -> Result<Arc<dyn Processor>> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_owned(), Box::new(factory));
    }

    /// Create a processor by name
    ///
    /// # Errors
    ///
    /// `UnknownName` if no factory is registered; factory errors pass
    /// through.
    pub fn create(&self, name: &str, params: &toml::Table) -> Result<Arc<dyn Processor>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| ProcessorError::UnknownName {
                name: name.to_owned(),
                available: self.available().join(", "),
            })?;
        factory(params)
    }

    /// Registered processor names, sorted
    pub fn available(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
