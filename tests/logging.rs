use evrelay::{LogBuffer, LogLevel, LogRecord};
use serde_json::Value;

#[test]
fn records_render_as_json_lines() {
    let mut buffer = LogBuffer::new(8);
    buffer.push(LogRecord::new(LogLevel::Info, "sink", "first entry"));

    let lines = buffer.json_lines().unwrap();
    assert_eq!(lines.len(), 1);
    let parsed: Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(parsed["level"], "INFO");
    assert_eq!(parsed["component"], "sink");
    assert_eq!(parsed["message"], "first entry");
}

#[test]
fn loglevel_override_filters_entries() {
    let mut buffer = LogBuffer::new(8);
    buffer.set_level(LogLevel::Warn);
    buffer.push(LogRecord::new(LogLevel::Info, "sink", "info suppressed"));
    buffer.push(LogRecord::new(LogLevel::Warn, "sink", "warn visible"));

    let records: Vec<_> = buffer.records().collect();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].level, LogLevel::Warn);
    assert_eq!(records[0].message, "warn visible");
}

#[test]
fn retention_cap_evicts_oldest_first() {
    let mut buffer = LogBuffer::new(2);
    for idx in 0..5 {
        buffer.push(LogRecord::new(LogLevel::Info, "sink", format!("entry {idx}")));
    }

    let records: Vec<_> = buffer.records().collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].message, "entry 3");
    assert_eq!(records[1].message, "entry 4");
    assert_eq!(buffer.dropped(), 3);
}

#[test]
fn level_ordering_matches_severity() {
    assert!(LogLevel::Debug < LogLevel::Info);
    assert!(LogLevel::Info < LogLevel::Warn);
    assert!(LogLevel::Warn < LogLevel::Error);
    assert_eq!(LogLevel::Error.to_string(), "ERROR");
}
