//! Engine - builds the configured flow and runs it to completion
//!
//! Selects the topology from config, wires adapters and the processor
//! through their registries, waits for a termination signal (or a fatal
//! flow error), then drains within the configured budget and prints the
//! final metrics snapshot.

use anyhow::{Context, Result};

use shunt_adapters::AdapterRegistry;
use shunt_config::{Config, FlowMode, LogFormat, ResolverKind};
use shunt_flow::{BackPressureSettings, Flow, FlowSettings};
use shunt_metrics::format;
use shunt_processor::ProcessorRegistry;
use shunt_routing::{DestinationResolver, TopicMap};

/// Run the configured flow until shutdown; returns the process exit code
pub async fn run(config: Config) -> Result<i32> {
    let adapters = AdapterRegistry::with_builtins();
    let processors = ProcessorRegistry::with_builtins();

    let mut flow = build_flow(&config, &adapters, &processors)?;
    flow.start().await?;

    wait_for_shutdown(&flow).await;

    let report = flow.stop().await;
    let snapshot = flow.snapshot();
    match config.log.format {
        LogFormat::Json => println!("{}", format::json(&snapshot)?),
        LogFormat::Console => print!("{}", format::human(&snapshot)),
    }

    Ok(if report.is_clean_stop() { 0 } else { 1 })
}

/// Construct the flow selected by `config.mode`
pub fn build_flow(
    config: &Config,
    adapters: &AdapterRegistry,
    processors: &ProcessorRegistry,
) -> Result<Flow> {
    let settings = FlowSettings {
        max_workers: config.thread_pool.max_workers,
        queue_size: config.thread_pool.queue_size,
        back_pressure: BackPressureSettings {
            enabled: config.back_pressure.enabled,
            high_watermark: config.back_pressure.queue_high_watermark,
            low_watermark: config.back_pressure.queue_low_watermark,
        },
        shutdown_timeout: config.shutdown_timeout,
    };
    let processor = processors.create(&config.processor.name, &config.processor.params)?;

    match config.mode {
        FlowMode::Funnel => {
            let funnel = config
                .funnel
                .as_ref()
                .context("funnel section missing")?;
            let mut sources = Vec::with_capacity(funnel.sources.len());
            for broker in &funnel.sources {
                let source = adapters.create_source(&broker.kind, &broker.connection)?;
                sources.push((source, broker.topics.clone()));
            }
            let publisher = adapters
                .create_publisher(&funnel.destination.kind, &funnel.destination.connection)?;
            Ok(Flow::funnel(
                sources,
                publisher,
                funnel.destination_topic.clone(),
                processor,
                settings,
            ))
        }
        FlowMode::Fan => {
            let fan = config.fan.as_ref().context("fan section missing")?;
            let source = adapters.create_source(&fan.source.kind, &fan.source.connection)?;
            let publisher =
                adapters.create_publisher(&fan.destination.kind, &fan.destination.connection)?;
            let key = &fan.destination_resolver.key;
            let resolver = match fan.destination_resolver.kind {
                ResolverKind::Header => DestinationResolver::header(key),
                ResolverKind::PayloadKey => DestinationResolver::payload_key(key),
            };
            Ok(Flow::fan(
                source,
                fan.source_topic.clone(),
                publisher,
                resolver,
                processor,
                settings,
            ))
        }
        FlowMode::OneToOne => {
            let one_to_one = config
                .one_to_one
                .as_ref()
                .context("one_to_one section missing")?;
            let source =
                adapters.create_source(&one_to_one.source.kind, &one_to_one.source.connection)?;
            let publisher = adapters.create_publisher(
                &one_to_one.destination.kind,
                &one_to_one.destination.connection,
            )?;
            let map = TopicMap::from_pairs(
                one_to_one
                    .mappings
                    .iter()
                    .map(|m| (m.source_topic.clone(), m.destination_topic.clone())),
            );
            Ok(Flow::one_to_one(source, publisher, map, processor, settings))
        }
    }
}

/// Block until SIGINT/SIGTERM arrives or the flow asks to shut down
async fn wait_for_shutdown(flow: &Flow) {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(signal) => signal,
                Err(error) => {
                    tracing::error!(error = %error, "failed to install SIGTERM handler");
                    flow.until_shutdown_requested().await;
                    return;
                }
            };
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(error) = result {
                    tracing::error!(error = %error, "interrupt handler failed");
                }
                tracing::info!("interrupt received, shutting down");
            }
            _ = sigterm.recv() => {
                tracing::info!("termination signal received, shutting down");
            }
            _ = flow.until_shutdown_requested() => {
                tracing::info!("flow requested shutdown");
            }
        }
    }
    #[cfg(not(unix))]
    {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(error) = result {
                    tracing::error!(error = %error, "interrupt handler failed");
                }
                tracing::info!("interrupt received, shutting down");
            }
            _ = flow.until_shutdown_requested() => {
                tracing::info!("flow requested shutdown");
            }
        }
    }
}
