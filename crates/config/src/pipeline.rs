//! Pipeline sizing, back-pressure, and processor configuration

use serde::Deserialize;

/// Worker pool and queue sizing
///
/// # Example
///
/// ```toml
/// [thread_pool]
/// max_workers = 20
/// queue_size = 2000
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThreadPoolConfig {
    /// Workers per stage pool
    /// Default: 20
    pub max_workers: usize,

    /// Capacity of each inter-stage queue
    /// Default: 2000
    pub queue_size: usize,
}

impl Default for ThreadPoolConfig {
    fn default() -> Self {
        Self {
            max_workers: 20,
            queue_size: 2000,
        }
    }
}

/// Throttle gate watermarks
///
/// # Example
///
/// ```toml
/// [back_pressure]
/// enabled = true
/// queue_high_watermark = 0.8
/// queue_low_watermark = 0.5
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackPressureConfig {
    /// Whether source consumers throttle at all
    /// Default: true
    pub enabled: bool,

    /// Queue fill fraction that engages the gate, in (0, 1]
    /// Default: 0.8
    pub queue_high_watermark: f64,

    /// Queue fill fraction that releases it, in (0, 1], <= high
    /// Default: 0.5
    pub queue_low_watermark: f64,
}

impl Default for BackPressureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            queue_high_watermark: 0.8,
            queue_low_watermark: 0.5,
        }
    }
}

/// Domain processor selection
///
/// # Example
///
/// ```toml
/// [processor]
/// name = "priority_filter"
///
/// [processor.params]
/// key = "priority"
/// min_priority = 5
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Registry name of the processor
    /// Default: "identity"
    pub name: String,

    /// Free-form parameter table handed to the processor factory
    pub params: toml::Table,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            name: "identity".into(),
            params: toml::Table::new(),
        }
    }
}
