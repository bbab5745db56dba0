//! Shunt Configuration
//!
//! TOML-based configuration with sensible defaults. A minimal config only
//! names the mode and its sub-tree; everything else can be omitted.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use shunt_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str(r#"
//! mode = "funnel"
//!
//! [funnel]
//! destination_topic = "out"
//! [[funnel.sources]]
//! type = "mock"
//! topics = ["t1"]
//! [funnel.destination]
//! type = "mock"
//! "#).unwrap();
//! assert_eq!(config.thread_pool.max_workers, 20);
//! ```

mod brokers;
mod error;
mod logging;
mod modes;
mod pipeline;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

pub use brokers::BrokerConfig;
pub use error::{ConfigError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use modes::{
    FanConfig, FunnelConfig, OneToOneConfig, ResolverConfig, ResolverKind, TopicMapping,
};
pub use pipeline::{BackPressureConfig, ProcessorConfig, ThreadPoolConfig};

/// Topology selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowMode {
    /// Many sources into one destination topic
    Funnel,
    /// One source topic, destinations resolved per message
    Fan,
    /// A list of source -> destination topic mappings
    OneToOne,
}

impl FlowMode {
    /// The config section name this mode requires
    pub fn section(&self) -> &'static str {
        match self {
            Self::Funnel => "funnel",
            Self::Fan => "fan",
            Self::OneToOne => "one_to_one",
        }
    }
}

/// Main configuration structure
///
/// Only `mode` and its matching sub-tree are required.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Which topology to run
    pub mode: FlowMode,

    /// Worker and queue sizing
    #[serde(default)]
    pub thread_pool: ThreadPoolConfig,

    /// Throttle gate watermarks
    #[serde(default)]
    pub back_pressure: BackPressureConfig,

    /// Domain processor selection
    #[serde(default)]
    pub processor: ProcessorConfig,

    /// Total drain budget for graceful shutdown
    /// Default: 30s
    #[serde(default = "default_shutdown_timeout", with = "humantime_serde")]
    pub shutdown_timeout: Duration,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,

    /// Funnel mode sub-tree
    pub funnel: Option<FunnelConfig>,

    /// Fan mode sub-tree
    pub fan: Option<FanConfig>,

    /// One-to-one mode sub-tree
    pub one_to_one: Option<OneToOneConfig>,
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML,
    /// or fails validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_str(&contents)
    }

    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Checks sizing, watermark ordering, and that the mode's sub-tree is
    /// present and internally consistent.
    fn validate(&self) -> Result<()> {
        validation::validate(self)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
