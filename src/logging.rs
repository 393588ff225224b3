use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use thiserror::Error;

const DEFAULT_LOG_CAPACITY: usize = 256;

/// Severity levels for sink lifecycle logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Returns the canonical uppercase representation.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured log entry recorded by a sink component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub component: &'static str,
    pub message: String,
}

impl LogRecord {
    pub fn new(level: LogLevel, component: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            component,
            message: message.into(),
        }
    }
}

/// Bounded in-memory log retention with level filtering and JSON-line
/// rendering. Oldest records are evicted first once the cap is reached.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    capacity: usize,
    min_level: LogLevel,
    records: VecDeque<LogRecord>,
    dropped: u64,
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl LogBuffer {
    /// Creates a buffer retaining at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            min_level: LogLevel::Debug,
            records: VecDeque::new(),
            dropped: 0,
        }
    }

    /// Returns the current minimum level.
    pub fn level(&self) -> LogLevel {
        self.min_level
    }

    /// Applies a dynamic log-level override.
    pub fn set_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    /// Records an entry, evicting the oldest record if the buffer is full.
    pub fn push(&mut self, record: LogRecord) {
        if record.level < self.min_level {
            return;
        }
        while self.records.len() >= self.capacity {
            self.records.pop_front();
            self.dropped = self.dropped.saturating_add(1);
        }
        self.records.push_back(record);
    }

    /// Retained records, oldest first.
    pub fn records(&self) -> impl Iterator<Item = &LogRecord> {
        self.records.iter()
    }

    /// Number of records evicted to honour the retention cap.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Renders the retained records as JSON lines.
    pub fn json_lines(&self) -> Result<Vec<String>, LoggingError> {
        self.records
            .iter()
            .map(|record| {
                let line = LogLine {
                    level: record.level.as_str(),
                    component: record.component,
                    message: &record.message,
                };
                serde_json::to_string(&line).map_err(LoggingError::Serialize)
            })
            .collect()
    }
}

/// Errors surfaced while serializing JSON-line logs.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to serialize log record: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct LogLine<'a> {
    level: &'a str,
    component: &'a str,
    message: &'a str,
}
