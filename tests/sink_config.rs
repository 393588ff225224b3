use evrelay::{ConfigError, Endpoint, SinkConfig, DEFAULT_BATCH_CAPACITY};
use serde_json::json;

#[test]
fn reads_required_keys_and_applies_batch_default() {
    let config = SinkConfig::from_value(&json!({
        "hostname": "collector.local",
        "port": 4545
    }))
    .unwrap();

    assert_eq!(config.hostname(), "collector.local");
    assert_eq!(config.port(), 4545);
    assert_eq!(config.batch_capacity(), DEFAULT_BATCH_CAPACITY);
    assert_eq!(config.endpoint().to_string(), "collector.local:4545");
}

#[test]
fn reads_explicit_batch_size() {
    let config = SinkConfig::from_value(&json!({
        "hostname": "collector.local",
        "port": 4545,
        "batch-size": 25
    }))
    .unwrap();

    assert_eq!(config.batch_capacity(), 25);
}

#[test]
fn rejects_missing_hostname() {
    let err = SinkConfig::from_value(&json!({ "port": 4545 })).unwrap_err();
    match err {
        ConfigError::MissingKey(key) => assert_eq!(key, "hostname"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn rejects_missing_port() {
    let err = SinkConfig::from_value(&json!({ "hostname": "collector.local" })).unwrap_err();
    match err {
        ConfigError::MissingKey(key) => assert_eq!(key, "port"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn rejects_out_of_range_port() {
    for port in [json!(0), json!(70_000), json!("4545")] {
        let err = SinkConfig::from_value(&json!({
            "hostname": "collector.local",
            "port": port
        }))
        .unwrap_err();
        assert!(err.to_string().contains("port"));
    }
}

#[test]
fn rejects_zero_batch_size() {
    let err = SinkConfig::from_value(&json!({
        "hostname": "collector.local",
        "port": 4545,
        "batch-size": 0
    }))
    .unwrap_err();
    assert!(err.to_string().contains("batch size"));

    let err = SinkConfig::new("collector.local", 4545)
        .unwrap()
        .with_batch_capacity(0)
        .unwrap_err();
    assert!(err.to_string().contains("batch capacity"));
}

#[test]
fn rejects_empty_hostname() {
    let err = Endpoint::new("   ", 4545).unwrap_err();
    assert!(err.to_string().contains("hostname"));

    let err = SinkConfig::from_value(&json!({
        "hostname": "",
        "port": 4545
    }))
    .unwrap_err();
    assert!(err.to_string().contains("hostname"));
}
