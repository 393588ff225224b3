use crate::config::Endpoint;
use crate::logging::{LogBuffer, LogLevel, LogRecord, LoggingError};
use crate::Event;
use std::fmt;

const COMPONENT: &str = "connection";

/// Capability surface required of a downstream collector connection.
pub trait RpcConnection {
    /// Self-reported liveness, consulted immediately before each use.
    fn is_active(&self) -> bool;

    /// Forwards an ordered batch. Succeeds or fails as a unit; there is no
    /// partial-batch acceptance contract.
    fn append_batch(&mut self, batch: &[Event]) -> Result<(), ConnectionError>;

    /// Closes the underlying handle. Callers treat failures as best-effort.
    fn close(&mut self) -> Result<(), ConnectionError>;
}

/// Builds connection handles for a target endpoint.
pub trait ConnectionFactory {
    fn connect(
        &self,
        endpoint: &Endpoint,
        capacity_hint: usize,
    ) -> Result<Box<dyn RpcConnection>, ConnectionError>;
}

/// Error raised when a connection cannot be created or used.
#[derive(Debug, Clone)]
pub struct ConnectionError {
    message: String,
}

impl ConnectionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "connection error: {}", self.message)
    }
}

impl std::error::Error for ConnectionError {}

/// Owns the single connection slot: at any instant the slot is either empty
/// or holds exactly one handle believed live. Handles never leave the
/// manager; batches are forwarded through [`ConnectionManager::append_batch`].
pub struct ConnectionManager<F: ConnectionFactory> {
    factory: F,
    endpoint: Endpoint,
    capacity_hint: usize,
    slot: Option<Box<dyn RpcConnection>>,
    telemetry: ConnectionTelemetry,
}

impl<F: ConnectionFactory> ConnectionManager<F> {
    /// Creates a manager with an empty slot. No connection is attempted
    /// until [`ConnectionManager::ensure_connected`] runs.
    pub fn new(factory: F, endpoint: Endpoint, capacity_hint: usize) -> Self {
        Self {
            factory,
            endpoint,
            capacity_hint,
            slot: None,
            telemetry: ConnectionTelemetry::default(),
        }
    }

    /// Target endpoint this manager connects to.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Whether the slot currently holds a handle.
    pub fn is_connected(&self) -> bool {
        self.slot.is_some()
    }

    /// Lifecycle counters and logs.
    pub fn telemetry(&self) -> &ConnectionTelemetry {
        &self.telemetry
    }

    /// Creates a connection if the slot is empty. A no-op when a handle
    /// already exists, regardless of its health. On factory failure the
    /// slot is left empty.
    pub fn ensure_connected(&mut self) -> Result<(), ConnectionError> {
        if self.slot.is_some() {
            return Ok(());
        }
        let handle = self.factory.connect(&self.endpoint, self.capacity_hint)?;
        self.slot = Some(handle);
        self.telemetry.metrics.connections_opened_total = self
            .telemetry
            .metrics
            .connections_opened_total
            .saturating_add(1);
        self.telemetry.log(
            LogLevel::Debug,
            format!(
                "opened connection to {} (capacity hint {})",
                self.endpoint, self.capacity_hint
            ),
        );
        Ok(())
    }

    /// Guarantees a handle believed live before use: connects when the slot
    /// is empty, and replaces the handle when its liveness predicate reports
    /// false.
    pub fn verify_connected(&mut self) -> Result<(), ConnectionError> {
        let stale = match &self.slot {
            Some(handle) => !handle.is_active(),
            None => false,
        };
        if stale {
            self.telemetry.log(
                LogLevel::Warn,
                format!("connection to {} reported inactive; reconnecting", self.endpoint),
            );
            self.teardown();
        }
        self.ensure_connected()
    }

    /// Forwards a batch through the live handle. Fails when the slot is
    /// empty; call [`ConnectionManager::verify_connected`] first.
    pub fn append_batch(&mut self, batch: &[Event]) -> Result<(), ConnectionError> {
        match self.slot.as_deref_mut() {
            Some(handle) => handle.append_batch(batch),
            None => Err(ConnectionError::new("no live connection in slot")),
        }
    }

    /// Closes the handle (best-effort) and clears the slot. Idempotent and
    /// infallible; close failures are logged and counted, never propagated.
    pub fn teardown(&mut self) {
        if let Some(mut handle) = self.slot.take() {
            if let Err(err) = handle.close() {
                self.telemetry.metrics.close_failures_total = self
                    .telemetry
                    .metrics
                    .close_failures_total
                    .saturating_add(1);
                self.telemetry.log(
                    LogLevel::Error,
                    format!("failed to close connection to {}: {}", self.endpoint, err),
                );
            }
            self.telemetry.metrics.connections_closed_total = self
                .telemetry
                .metrics
                .connections_closed_total
                .saturating_add(1);
        }
    }
}

/// Connection lifecycle telemetry: counters plus bounded structured logs.
#[derive(Debug, Default, Clone)]
pub struct ConnectionTelemetry {
    metrics: ConnectionMetrics,
    logs: LogBuffer,
}

impl ConnectionTelemetry {
    /// Current counter snapshot.
    pub fn metrics(&self) -> &ConnectionMetrics {
        &self.metrics
    }

    /// Structured logs emitted around connection lifecycle transitions.
    pub fn logs(&self) -> impl Iterator<Item = &LogRecord> {
        self.logs.records()
    }

    /// Renders the retained logs as JSON lines.
    pub fn json_log_lines(&self) -> Result<Vec<String>, LoggingError> {
        self.logs.json_lines()
    }

    /// Renders counters as Prometheus exposition text.
    pub fn render_metrics(&self) -> String {
        format!(
            "evrelay_connections_opened_total {}\nevrelay_connections_closed_total {}\nevrelay_close_failures_total {}\n",
            self.metrics.connections_opened_total,
            self.metrics.connections_closed_total,
            self.metrics.close_failures_total
        )
    }

    fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.logs.push(LogRecord::new(level, COMPONENT, message));
    }
}

/// Monotonic connection lifecycle counters.
#[derive(Debug, Default, Clone)]
pub struct ConnectionMetrics {
    pub connections_opened_total: u64,
    pub connections_closed_total: u64,
    pub close_failures_total: u64,
}
