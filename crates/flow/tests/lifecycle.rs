//! Back-pressure and shutdown behavior under load

use std::sync::Arc;
use std::time::Duration;

use shunt_adapters::mock::{MockPublisher, MockSource};
use shunt_adapters::{AdapterError, Source};
use shunt_flow::{BackPressureSettings, Flow, FlowSettings, FlowState};
use shunt_processor::IdentityProcessor;
use shunt_protocol::Message;

const WAIT: Duration = Duration::from_secs(30);

async fn wait_until(mut cond: impl FnMut() -> bool) {
    let start = tokio::time::Instant::now();
    while !cond() {
        assert!(start.elapsed() < WAIT, "condition not met in time");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

fn seeded_funnel(count: usize, publisher: MockPublisher, settings: FlowSettings) -> Flow {
    let messages = (0..count)
        .map(|i| Message::new("load", format!("m{i}")))
        .collect();
    Flow::funnel(
        vec![(
            Box::new(MockSource::with_messages(messages)) as Box<dyn Source>,
            vec!["load".into()],
        )],
        Box::new(publisher),
        "out",
        Arc::new(IdentityProcessor::new()),
        settings,
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn back_pressure_engages_under_slow_publisher_without_loss() {
    const COUNT: usize = 100;

    let publisher = MockPublisher::with_delay(Duration::from_millis(10));
    let log = publisher.log();

    let mut flow = seeded_funnel(
        COUNT,
        publisher,
        FlowSettings {
            max_workers: 1,
            queue_size: 10,
            back_pressure: BackPressureSettings {
                enabled: true,
                high_watermark: 0.8,
                low_watermark: 0.5,
            },
            shutdown_timeout: Duration::from_secs(30),
        },
    );
    flow.start().await.unwrap();
    wait_until(|| log.len() == COUNT).await;
    let report = flow.stop().await;
    assert!(report.is_clean_stop());

    // The consumer outpaces a 10ms-per-message publisher through a
    // 10-slot queue, so the gate must have engaged at least once; no
    // message may be dropped for it
    assert!(flow.back_pressure_engagements() > 0);
    let snapshot = flow.snapshot();
    assert!(snapshot.domain_throttle_engagements > 0);
    assert_eq!(snapshot.source_total(), COUNT as u64);
    assert_eq!(snapshot.destination_total(), COUNT as u64);
    assert_eq!(snapshot.error_total(), 0);
}

#[tokio::test]
async fn disabled_back_pressure_never_throttles() {
    const COUNT: usize = 30;

    let publisher = MockPublisher::with_delay(Duration::from_millis(5));
    let log = publisher.log();

    let mut flow = seeded_funnel(
        COUNT,
        publisher,
        FlowSettings {
            max_workers: 1,
            queue_size: 10,
            back_pressure: BackPressureSettings {
                enabled: false,
                ..BackPressureSettings::default()
            },
            shutdown_timeout: Duration::from_secs(30),
        },
    );
    flow.start().await.unwrap();
    wait_until(|| log.len() == COUNT).await;
    flow.stop().await;

    // The blocking queues alone carry the load
    assert_eq!(flow.back_pressure_engagements(), 0);
    let snapshot = flow.snapshot();
    assert_eq!(snapshot.domain_throttle_engagements, 0);
    assert_eq!(snapshot.publish_throttle_engagements, 0);
    assert_eq!(snapshot.destination_total(), COUNT as u64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shutdown_under_load_loses_no_accounting() {
    const COUNT: usize = 10_000;

    let publisher = MockPublisher::new();
    let log = publisher.log();

    let mut flow = seeded_funnel(
        COUNT,
        publisher,
        FlowSettings {
            max_workers: 4,
            queue_size: 64,
            shutdown_timeout: Duration::from_secs(30),
            ..FlowSettings::default()
        },
    );
    flow.start().await.unwrap();

    // Stop mid-stream: whatever was consumed must drain through
    tokio::time::sleep(Duration::from_millis(100)).await;
    let report = flow.stop().await;
    assert!(report.is_clean_stop());

    let snapshot = flow.metrics().snapshot();
    assert_eq!(snapshot.error_total(), 0);
    assert_eq!(snapshot.filtered_count, 0);
    // Every consumed message was delivered; nothing vanished in a queue
    assert_eq!(snapshot.destination_total(), snapshot.source_total());
    assert_eq!(log.len() as u64, snapshot.destination_total());
}

#[tokio::test]
async fn drain_completes_in_flight_messages() {
    const COUNT: usize = 50;

    let publisher = MockPublisher::with_delay(Duration::from_millis(5));
    let log = publisher.log();

    let mut flow = seeded_funnel(
        COUNT,
        publisher,
        FlowSettings {
            max_workers: 2,
            queue_size: 16,
            shutdown_timeout: Duration::from_secs(30),
            ..FlowSettings::default()
        },
    );
    flow.start().await.unwrap();

    // Give the consumer a head start, then stop while publishes lag
    wait_until(|| log.len() >= 5).await;
    let report = flow.stop().await;
    assert!(report.is_clean_stop());

    let snapshot = flow.metrics().snapshot();
    assert_eq!(snapshot.destination_total(), snapshot.source_total());
}

#[tokio::test]
async fn transient_publish_error_costs_one_message() {
    const COUNT: usize = 5;

    let publisher = MockPublisher::new();
    let log = publisher.log();
    let faults = publisher.faults();
    faults.push(AdapterError::transient_on("out", "broker hiccup"));

    let mut flow = seeded_funnel(
        COUNT,
        publisher,
        FlowSettings {
            max_workers: 1,
            queue_size: 8,
            shutdown_timeout: Duration::from_secs(10),
            ..FlowSettings::default()
        },
    );
    flow.start().await.unwrap();
    wait_until(|| log.len() == COUNT - 1).await;
    let report = flow.stop().await;
    assert!(report.is_clean_stop());

    let snapshot = flow.metrics().snapshot();
    assert_eq!(snapshot.source_total(), COUNT as u64);
    assert_eq!(snapshot.destination["out"].message_count, COUNT as u64 - 1);
    assert_eq!(snapshot.destination["out"].error_count, 1);
}

#[tokio::test]
async fn fatal_publish_error_fails_the_flow() {
    let publisher = MockPublisher::new();
    let faults = publisher.faults();
    faults.push(AdapterError::fatal_on("out", "authorization revoked"));

    let mut flow = seeded_funnel(
        3,
        publisher,
        FlowSettings {
            max_workers: 1,
            queue_size: 8,
            shutdown_timeout: Duration::from_secs(10),
            ..FlowSettings::default()
        },
    );
    flow.start().await.unwrap();

    tokio::time::timeout(WAIT, flow.until_shutdown_requested())
        .await
        .expect("fatal publish error should request shutdown");
    let report = flow.stop().await;

    assert_eq!(report.state, FlowState::Failed);
    let snapshot = flow.metrics().snapshot();
    assert_eq!(snapshot.destination["out"].error_count, 1);
}
