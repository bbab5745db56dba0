//! Message tests

use serde_json::json;

use crate::Message;

#[test]
fn test_new_message() {
    let msg = Message::new("orders", "order-123");

    assert_eq!(msg.source_topic(), "orders");
    assert_eq!(msg.payload().as_ref(), b"order-123");
    assert_eq!(msg.payload_len(), 9);
    assert!(msg.destination_topic().is_none());
    assert!(msg.headers().is_empty());
    assert!(msg.metadata().is_empty());
}

#[test]
fn test_headers() {
    let mut msg = Message::new("t", "x")
        .with_header("a", "1")
        .with_header("b", "2");

    assert_eq!(msg.header("a"), Some("1"));
    assert_eq!(msg.header("b"), Some("2"));
    assert_eq!(msg.header("missing"), None);

    msg.insert_header("a", "overwritten");
    assert_eq!(msg.header("a"), Some("overwritten"));
    assert_eq!(msg.headers().len(), 2);
}

#[test]
fn test_destination_topic() {
    let mut msg = Message::new("in", "x");
    msg.set_destination_topic("out");
    assert_eq!(msg.destination_topic(), Some("out"));
}

#[test]
fn test_metadata_passthrough() {
    let msg = Message::new("t", "x")
        .with_metadata("partition", json!(3))
        .with_metadata("offset", json!(1742));

    assert_eq!(msg.metadata()["partition"], json!(3));
    assert_eq!(msg.metadata()["offset"], json!(1742));
}

#[test]
fn test_timestamp_override() {
    use chrono::{TimeZone, Utc};

    let captured = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let msg = Message::new("t", "x").with_timestamp(captured);
    assert_eq!(msg.timestamp(), captured);

    // Default timestamp is capture time, not epoch
    let fresh = Message::new("t", "x");
    assert!(fresh.timestamp() > captured);
}

#[test]
fn test_clone_shares_payload() {
    let msg = Message::new("t", vec![0u8; 1024]);
    let copy = msg.clone();

    // Bytes clones share the buffer
    assert_eq!(msg.payload().as_ptr(), copy.payload().as_ptr());
}

#[test]
fn test_set_payload() {
    let mut msg = Message::new("t", "before");
    msg.set_payload("after");
    assert_eq!(msg.payload().as_ref(), b"after");
}
