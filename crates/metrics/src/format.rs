//! Final-report formatting
//!
//! Renders a `FlowSnapshot` for the report emitted at shutdown.
//!
//! # Example output (human)
//!
//! ```text
//! uptime: 12.4s | filtered: 0 | throttle engagements: 3 domain, 0 publish
//! source      orders               1042 msgs   52.1 KB   0 err   84.0/s
//! source      payments              511 msgs   25.6 KB   0 err   41.2/s
//! destination orders-processed     1042 msgs   52.1 KB   0 err   84.0/s
//! ```

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::{FlowSnapshot, TopicSnapshot};

/// Render a snapshot as a human-readable table
pub fn human(snapshot: &FlowSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "uptime: {:.1}s | filtered: {} | throttle engagements: {} domain, {} publish",
        snapshot.uptime_seconds,
        snapshot.filtered_count,
        snapshot.domain_throttle_engagements,
        snapshot.publish_throttle_engagements,
    );
    write_side(&mut out, "source", &snapshot.source);
    write_side(&mut out, "destination", &snapshot.destination);
    if snapshot.source.is_empty() && snapshot.destination.is_empty() {
        out.push_str("no traffic recorded\n");
    }
    out
}

/// Render a snapshot as pretty-printed JSON
pub fn json(snapshot: &FlowSnapshot) -> serde_json::Result<String> {
    serde_json::to_string_pretty(snapshot)
}

fn write_side(out: &mut String, side: &str, topics: &BTreeMap<String, TopicSnapshot>) {
    for (topic, t) in topics {
        let _ = writeln!(
            out,
            "{side:<11} {topic:<24} {:>8} msgs {:>10} {:>4} err {:>8.1}/s",
            t.message_count,
            format_bytes(t.total_bytes),
            t.error_count,
            t.rate_per_second,
        );
    }
}

/// Format a byte count with a binary-ish unit suffix
fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let b = bytes as f64;
    if b >= GB {
        format!("{:.1} GB", b / GB)
    } else if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MetricsCollector;

    #[test]
    fn test_human_lists_both_sides() {
        let collector = MetricsCollector::new();
        collector.record_source("in", 2048);
        collector.record_destination("out", 2048);
        collector.record_destination_error("out");

        let text = human(&collector.snapshot());
        assert!(text.contains("in"));
        assert!(text.contains("out"));
        assert!(text.contains("2.0 KB"));
        assert!(text.contains("1 err"));
        assert!(text.contains("throttle engagements: 0 domain, 0 publish"));
    }

    #[test]
    fn test_human_renders_throttle_engagements() {
        let collector = MetricsCollector::new();
        collector.record_source("in", 10);

        let snapshot = collector.snapshot().with_throttle_engagements(3, 1);
        let text = human(&snapshot);
        assert!(text.contains("throttle engagements: 3 domain, 1 publish"));
    }

    #[test]
    fn test_human_empty() {
        let text = human(&MetricsCollector::new().snapshot());
        assert!(text.contains("no traffic recorded"));
    }

    #[test]
    fn test_json_round_trips() {
        let collector = MetricsCollector::new();
        collector.record_source("in", 10);
        collector.record_filtered();

        let snapshot = collector.snapshot().with_throttle_engagements(2, 0);
        let text = json(&snapshot).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["filtered_count"], 1);
        assert_eq!(value["source"]["in"]["message_count"], 1);
        assert_eq!(value["domain_throttle_engagements"], 2);
        assert_eq!(value["publish_throttle_engagements"], 0);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5.0 GB");
    }
}
