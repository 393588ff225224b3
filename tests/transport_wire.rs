use evrelay::{
    ConnectionFactory, Endpoint, Event, HttpBatchConnection, HttpConnectionFactory, RpcConnection,
    WireEvent,
};
use serde_json::Value;

fn endpoint() -> Endpoint {
    Endpoint::new("collector.local", 4545).unwrap()
}

#[test]
fn wire_event_encodes_headers_and_base64_body() {
    let event = Event::new(b"payload".to_vec())
        .with_header("host", "agent-1")
        .with_header("timestamp", "1700000000");
    let wire = WireEvent::from_event(&event);

    assert_eq!(wire.headers.get("host").map(String::as_str), Some("agent-1"));
    assert_eq!(wire.body_b64, "cGF5bG9hZA==");
    assert_eq!(wire.decode_body().unwrap(), b"payload".to_vec());
}

#[test]
fn wire_event_field_names_are_stable() {
    let wire = WireEvent::from_event(&Event::new(b"x".to_vec()).with_header("k", "v"));
    let value = serde_json::to_value(&wire).unwrap();

    assert!(value.get("headers").is_some());
    assert!(value.get("body_b64").is_some());
    assert_eq!(value["headers"]["k"], "v");

    let parsed: WireEvent = serde_json::from_value(value).unwrap();
    assert_eq!(parsed, wire);
}

#[test]
fn wire_event_rejects_invalid_body_encoding() {
    let wire = WireEvent {
        headers: Default::default(),
        body_b64: "not base64!".to_string(),
    };
    let err = wire.decode_body().unwrap_err();
    assert!(err.to_string().contains("decode failed"));
}

#[test]
fn connection_builds_batch_url_from_endpoint() {
    let connection = HttpBatchConnection::connect(&endpoint(), 100).unwrap();
    assert_eq!(connection.batch_url(), "http://collector.local:4545/v1/batch");
    assert!(connection.is_active());
}

#[test]
fn closed_connection_reports_inactive_and_refuses_sends() {
    let mut connection = HttpBatchConnection::connect(&endpoint(), 100).unwrap();
    connection.close().unwrap();

    assert!(!connection.is_active());
    let err = connection
        .append_batch(&[Event::new(b"payload".to_vec())])
        .unwrap_err();
    assert!(err.to_string().contains("closed"));
}

#[test]
fn factory_produces_boxed_connections() {
    let factory = HttpConnectionFactory;
    let connection = factory.connect(&endpoint(), 25).unwrap();
    assert!(connection.is_active());
}

#[test]
fn empty_body_encodes_to_empty_string() {
    let value: Value = serde_json::to_value(WireEvent::from_event(&Event::new(Vec::new()))).unwrap();
    assert_eq!(value["body_b64"], "");
}
