//! Configuration validation
//!
//! Structural checks beyond what the TOML type layer enforces: sizing,
//! watermark ordering, and mode sub-tree consistency.

use std::collections::HashSet;

use crate::{Config, ConfigError, FlowMode, Result};

/// Validate a parsed configuration
pub fn validate(config: &Config) -> Result<()> {
    validate_pipeline(config)?;
    match config.mode {
        FlowMode::Funnel => validate_funnel(config),
        FlowMode::Fan => validate_fan(config),
        FlowMode::OneToOne => validate_one_to_one(config),
    }
}

fn validate_pipeline(config: &Config) -> Result<()> {
    if config.thread_pool.max_workers == 0 {
        return Err(ConfigError::invalid_value(
            "thread_pool",
            "max_workers",
            "must be at least 1",
        ));
    }
    if config.thread_pool.queue_size == 0 {
        return Err(ConfigError::invalid_value(
            "thread_pool",
            "queue_size",
            "must be at least 1",
        ));
    }

    let bp = &config.back_pressure;
    for (field, value) in [
        ("queue_high_watermark", bp.queue_high_watermark),
        ("queue_low_watermark", bp.queue_low_watermark),
    ] {
        if !(value > 0.0 && value <= 1.0) {
            return Err(ConfigError::invalid_value(
                "back_pressure",
                field,
                format!("{value} is outside (0, 1]"),
            ));
        }
    }
    if bp.queue_low_watermark > bp.queue_high_watermark {
        return Err(ConfigError::invalid_value(
            "back_pressure",
            "queue_low_watermark",
            "must not exceed queue_high_watermark",
        ));
    }

    if config.shutdown_timeout.is_zero() {
        return Err(ConfigError::invalid_value(
            "shutdown_timeout",
            "shutdown_timeout",
            "must be positive",
        ));
    }

    if config.processor.name.is_empty() {
        return Err(ConfigError::invalid_value(
            "processor",
            "name",
            "must not be empty",
        ));
    }
    Ok(())
}

fn validate_funnel(config: &Config) -> Result<()> {
    let funnel = config
        .funnel
        .as_ref()
        .ok_or_else(|| ConfigError::missing_section(FlowMode::Funnel.section()))?;

    if funnel.sources.is_empty() {
        return Err(ConfigError::invalid_value(
            "funnel",
            "sources",
            "at least one source is required",
        ));
    }
    for source in &funnel.sources {
        if source.topics.is_empty() {
            return Err(ConfigError::invalid_value(
                "funnel",
                "sources",
                format!("source '{}' subscribes to no topics", source.kind),
            ));
        }
    }
    if funnel.destination_topic.is_empty() {
        return Err(ConfigError::invalid_value(
            "funnel",
            "destination_topic",
            "must not be empty",
        ));
    }
    Ok(())
}

fn validate_fan(config: &Config) -> Result<()> {
    let fan = config
        .fan
        .as_ref()
        .ok_or_else(|| ConfigError::missing_section(FlowMode::Fan.section()))?;

    if fan.source_topic.is_empty() {
        return Err(ConfigError::invalid_value(
            "fan",
            "source_topic",
            "must not be empty",
        ));
    }
    if fan.destination_resolver.key.is_empty() {
        return Err(ConfigError::invalid_value(
            "fan",
            "destination_resolver",
            "key must not be empty",
        ));
    }
    Ok(())
}

fn validate_one_to_one(config: &Config) -> Result<()> {
    let one_to_one = config
        .one_to_one
        .as_ref()
        .ok_or_else(|| ConfigError::missing_section(FlowMode::OneToOne.section()))?;

    if one_to_one.mappings.is_empty() {
        return Err(ConfigError::invalid_value(
            "one_to_one",
            "mappings",
            "at least one mapping is required",
        ));
    }

    let mut seen = HashSet::new();
    for mapping in &one_to_one.mappings {
        if mapping.source_topic.is_empty() || mapping.destination_topic.is_empty() {
            return Err(ConfigError::invalid_value(
                "one_to_one",
                "mappings",
                "topics must not be empty",
            ));
        }
        if !seen.insert(mapping.source_topic.as_str()) {
            return Err(ConfigError::duplicate_source_topic(&mapping.source_topic));
        }
    }
    Ok(())
}
