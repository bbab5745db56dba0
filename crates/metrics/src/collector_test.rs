//! Metrics collector tests

use std::sync::Arc;
use std::thread;

use crate::MetricsCollector;

#[test]
fn test_empty_snapshot() {
    let collector = MetricsCollector::new();
    let snapshot = collector.snapshot();

    assert!(snapshot.source.is_empty());
    assert!(snapshot.destination.is_empty());
    assert_eq!(snapshot.filtered_count, 0);
    assert_eq!(snapshot.source_total(), 0);
    assert_eq!(snapshot.destination_total(), 0);
}

#[test]
fn test_record_source() {
    let collector = MetricsCollector::new();

    collector.record_source("t1", 100);
    collector.record_source("t1", 50);
    collector.record_source("t2", 10);

    let snapshot = collector.snapshot();
    assert_eq!(snapshot.source["t1"].message_count, 2);
    assert_eq!(snapshot.source["t1"].total_bytes, 150);
    assert_eq!(snapshot.source["t2"].message_count, 1);
    assert_eq!(snapshot.source_total(), 3);
    assert!(snapshot.source["t1"].last_message_time.is_some());
}

#[test]
fn test_record_destination() {
    let collector = MetricsCollector::new();

    collector.record_destination("out", 42);

    let snapshot = collector.snapshot();
    assert_eq!(snapshot.destination["out"].message_count, 1);
    assert_eq!(snapshot.destination["out"].total_bytes, 42);
    assert!(snapshot.source.is_empty());
}

#[test]
fn test_errors_attributed_per_side() {
    let collector = MetricsCollector::new();

    collector.record_source_error("in");
    collector.record_source_error("in");
    collector.record_destination_error("out");

    let snapshot = collector.snapshot();
    assert_eq!(snapshot.source["in"].error_count, 2);
    assert_eq!(snapshot.destination["out"].error_count, 1);
    assert_eq!(snapshot.error_total(), 3);
    // An error alone creates the topic entry but records no message
    assert_eq!(snapshot.source["in"].message_count, 0);
    assert!(snapshot.source["in"].last_message_time.is_none());
}

#[test]
fn test_throttle_engagements_overlay() {
    let collector = MetricsCollector::new();

    // The collector itself knows nothing about the gates
    let snapshot = collector.snapshot();
    assert_eq!(snapshot.domain_throttle_engagements, 0);
    assert_eq!(snapshot.publish_throttle_engagements, 0);

    let snapshot = snapshot.with_throttle_engagements(4, 2);
    assert_eq!(snapshot.domain_throttle_engagements, 4);
    assert_eq!(snapshot.publish_throttle_engagements, 2);
}

#[test]
fn test_filtered_count() {
    let collector = MetricsCollector::new();

    collector.record_filtered();
    collector.record_filtered();

    assert_eq!(collector.filtered_count(), 2);
    assert_eq!(collector.snapshot().filtered_count, 2);
}

#[test]
fn test_rate_positive() {
    let collector = MetricsCollector::new();
    collector.record_source("t", 1);

    let snapshot = collector.snapshot();
    assert!(snapshot.source["t"].rate_per_second > 0.0);
    assert!(snapshot.uptime_seconds >= 0.0);
}

#[test]
fn test_snapshot_is_a_copy() {
    let collector = MetricsCollector::new();
    collector.record_source("t", 1);

    let before = collector.snapshot();
    collector.record_source("t", 1);
    let after = collector.snapshot();

    assert_eq!(before.source["t"].message_count, 1);
    assert_eq!(after.source["t"].message_count, 2);
}

#[test]
fn test_concurrent_writers() {
    let collector = Arc::new(MetricsCollector::new());
    let mut handles = vec![];

    for _ in 0..4 {
        let c = Arc::clone(&collector);
        handles.push(thread::spawn(move || {
            for _ in 0..1000 {
                c.record_source("shared", 10);
                c.record_destination("out", 10);
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let snapshot = collector.snapshot();
    assert_eq!(snapshot.source["shared"].message_count, 4000);
    assert_eq!(snapshot.source["shared"].total_bytes, 40000);
    assert_eq!(snapshot.destination["out"].message_count, 4000);
}
