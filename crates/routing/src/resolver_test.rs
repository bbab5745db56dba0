//! Destination resolver tests

use shunt_protocol::Message;

use crate::{DestinationResolver, RouteError};

#[test]
fn test_header_resolution() {
    let resolver = DestinationResolver::header("destination_topic");
    let msg = Message::new("in", "X").with_header("destination_topic", "orders");

    assert_eq!(resolver.resolve(&msg).unwrap(), "orders");
}

#[test]
fn test_header_missing() {
    let resolver = DestinationResolver::header("destination_topic");
    let msg = Message::new("in", "X").with_header("other", "value");

    let err = resolver.resolve(&msg).unwrap_err();
    assert!(matches!(err, RouteError::MissingHeader { .. }));
    assert!(err.to_string().contains("destination_topic"));
}

#[test]
fn test_payload_key_resolution() {
    let resolver = DestinationResolver::payload_key("routing_key");
    let msg = Message::new("in", r#"{"routing_key":"metrics","data":"cpu"}"#);

    assert_eq!(resolver.resolve(&msg).unwrap(), "metrics");
}

#[test]
fn test_payload_key_missing() {
    let resolver = DestinationResolver::payload_key("routing_key");
    let msg = Message::new("in", r#"{"data":"cpu"}"#);

    let err = resolver.resolve(&msg).unwrap_err();
    assert!(matches!(err, RouteError::MissingKey { .. }));
}

#[test]
fn test_payload_not_json() {
    let resolver = DestinationResolver::payload_key("routing_key");
    let msg = Message::new("in", "plain text");

    let err = resolver.resolve(&msg).unwrap_err();
    assert!(matches!(err, RouteError::InvalidPayload(_)));
}

#[test]
fn test_payload_not_an_object() {
    let resolver = DestinationResolver::payload_key("routing_key");
    let msg = Message::new("in", r#"["an","array"]"#);

    assert!(matches!(
        resolver.resolve(&msg).unwrap_err(),
        RouteError::InvalidPayload(_)
    ));
}

#[test]
fn test_numeric_value_coerced() {
    let resolver = DestinationResolver::payload_key("shard");
    let msg = Message::new("in", r#"{"shard": 7}"#);

    assert_eq!(resolver.resolve(&msg).unwrap(), "7");
}

#[test]
fn test_bool_value_coerced() {
    let resolver = DestinationResolver::payload_key("flag");
    let msg = Message::new("in", r#"{"flag": true}"#);

    assert_eq!(resolver.resolve(&msg).unwrap(), "true");
}

#[test]
fn test_object_value_rejected() {
    let resolver = DestinationResolver::payload_key("nested");
    let msg = Message::new("in", r#"{"nested": {"a": 1}}"#);

    let err = resolver.resolve(&msg).unwrap_err();
    assert!(matches!(err, RouteError::UnroutableValue { .. }));
}

#[test]
fn test_null_value_rejected() {
    let resolver = DestinationResolver::payload_key("key");
    let msg = Message::new("in", r#"{"key": null}"#);

    assert!(matches!(
        resolver.resolve(&msg).unwrap_err(),
        RouteError::UnroutableValue { .. }
    ));
}
