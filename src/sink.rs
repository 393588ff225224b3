use crate::channel::{Channel, TakeOutcome, Transaction};
use crate::config::SinkConfig;
use crate::connection::{ConnectionError, ConnectionFactory, ConnectionManager, ConnectionTelemetry};
use crate::logging::{LogBuffer, LogLevel, LogRecord, LoggingError};
use crate::Event;
use std::fmt;
use thiserror::Error;

const COMPONENT: &str = "sink";

/// Per-invocation signal returned to the driving scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkStatus {
    /// The scheduler may invoke again immediately.
    Ready,
    /// The scheduler should delay the next invocation.
    Backoff,
}

/// Hard delivery failure surfaced after rollback and connection teardown.
/// The next invocation must reconnect before sending.
#[derive(Debug, Error)]
#[error("failed to forward event batch: {source}")]
pub struct DeliveryError {
    #[from]
    source: ConnectionError,
}

/// Batched, transactional event-forwarding sink. Each [`RelaySink::process`]
/// invocation moves up to the configured batch capacity of events from the
/// channel to the downstream collector, atomically with respect to the
/// channel's transaction scope.
pub struct RelaySink<C: Channel, F: ConnectionFactory> {
    channel: C,
    connection: ConnectionManager<F>,
    batch_capacity: usize,
    telemetry: SinkTelemetry,
}

impl<C: Channel, F: ConnectionFactory> RelaySink<C, F> {
    /// Creates a sink draining `channel` toward the configured endpoint.
    /// The batch capacity is also passed to the factory as a sizing hint.
    pub fn new(config: SinkConfig, channel: C, factory: F) -> Self {
        let batch_capacity = config.batch_capacity();
        let connection =
            ConnectionManager::new(factory, config.endpoint().clone(), batch_capacity);
        Self {
            channel,
            connection,
            batch_capacity,
            telemetry: SinkTelemetry::default(),
        }
    }

    /// Optimistic eager connection attempt. Failure is swallowed (and the
    /// slot torn down) because [`RelaySink::process`] reconnects lazily; the
    /// downstream collector may also become unavailable later, so the lazy
    /// path must work regardless.
    pub fn start(&mut self) {
        let message = format!("starting {self}");
        self.telemetry.log(LogLevel::Info, message);
        if let Err(err) = self.connection.ensure_connected() {
            self.telemetry.log(
                LogLevel::Warn,
                format!(
                    "unable to create connection to {}: {}; will retry on next invocation",
                    self.connection.endpoint(),
                    err
                ),
            );
            self.connection.teardown();
        }
    }

    /// Tears down the connection unconditionally. Idempotent.
    pub fn stop(&mut self) {
        self.connection.teardown();
        let message = format!("stopped {self}");
        self.telemetry.log(LogLevel::Info, message);
    }

    /// One complete dispatch attempt. Returns the scheduler signal, or a
    /// [`DeliveryError`] after any connection-level failure (the transaction
    /// is rolled back and the connection torn down first). Channel-level
    /// errors roll back and surface only as [`SinkStatus::Backoff`].
    pub fn process(&mut self) -> Result<SinkStatus, DeliveryError> {
        let mut txn = match self.channel.begin_transaction() {
            Ok(txn) => txn,
            Err(err) => {
                self.telemetry.log(
                    LogLevel::Error,
                    format!("unable to open channel transaction: {err}"),
                );
                return Ok(SinkStatus::Backoff);
            }
        };
        let outcome = self.dispatch(&mut txn);
        txn.close();
        outcome
    }

    fn dispatch(&mut self, txn: &mut C::Transaction) -> Result<SinkStatus, DeliveryError> {
        let mut status = SinkStatus::Ready;

        if let Err(err) = self.connection.verify_connected() {
            return Err(self.fail_delivery(txn, err));
        }

        let mut batch: Vec<Event> = Vec::with_capacity(self.batch_capacity);
        for _ in 0..self.batch_capacity {
            match txn.take() {
                Ok(TakeOutcome::Event(event)) => batch.push(event),
                Ok(TakeOutcome::Empty) => {
                    self.telemetry.record_underflow();
                    break;
                }
                Err(err) => {
                    self.rollback_quietly(txn);
                    self.telemetry.log(
                        LogLevel::Error,
                        format!("unable to take event from channel: {err}"),
                    );
                    return Ok(SinkStatus::Backoff);
                }
            }
        }

        if batch.is_empty() {
            self.telemetry.record_empty();
            status = SinkStatus::Backoff;
        } else if let Err(err) = self.connection.append_batch(&batch) {
            return Err(self.fail_delivery(txn, err));
        }

        match txn.commit() {
            Ok(()) => {
                self.telemetry.record_success();
                Ok(status)
            }
            Err(err) => {
                self.rollback_quietly(txn);
                self.telemetry.log(
                    LogLevel::Error,
                    format!("unable to commit channel transaction: {err}"),
                );
                Ok(SinkStatus::Backoff)
            }
        }
    }

    fn fail_delivery(&mut self, txn: &mut C::Transaction, err: ConnectionError) -> DeliveryError {
        self.rollback_quietly(txn);
        self.connection.teardown();
        self.telemetry.log(
            LogLevel::Error,
            format!("delivery failed, connection torn down: {err}"),
        );
        DeliveryError::from(err)
    }

    fn rollback_quietly(&mut self, txn: &mut C::Transaction) {
        if let Err(err) = txn.rollback() {
            self.telemetry
                .log(LogLevel::Warn, format!("transaction rollback failed: {err}"));
        }
    }

    /// Batch counters and sink logs.
    pub fn telemetry(&self) -> &SinkTelemetry {
        &self.telemetry
    }

    /// Connection lifecycle counters and logs.
    pub fn connection_telemetry(&self) -> &ConnectionTelemetry {
        self.connection.telemetry()
    }

    /// Whether the connection slot currently holds a handle.
    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Renders every sink and connection counter as Prometheus exposition.
    pub fn render_metrics(&self) -> String {
        format!(
            "{}{}",
            self.telemetry.render_metrics(),
            self.connection.telemetry().render_metrics()
        )
    }
}

impl<C: Channel, F: ConnectionFactory> fmt::Display for RelaySink<C, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "relay sink {{ endpoint: {} }}", self.connection.endpoint())
    }
}

/// Batch dispatch telemetry: counters plus bounded structured logs.
#[derive(Debug, Default, Clone)]
pub struct SinkTelemetry {
    metrics: SinkMetrics,
    logs: LogBuffer,
}

impl SinkTelemetry {
    /// Current counter snapshot.
    pub fn metrics(&self) -> &SinkMetrics {
        &self.metrics
    }

    /// Structured logs emitted around the dispatch loop.
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
            "evrelay_batch_success_total {}\nevrelay_batch_empty_total {}\nevrelay_batch_underflow_total {}\n",
            self.metrics.batch_success_total,
            self.metrics.batch_empty_total,
            self.metrics.batch_underflow_total
        )
    }

    fn record_success(&mut self) {
        self.metrics.batch_success_total = self.metrics.batch_success_total.saturating_add(1);
    }

    fn record_empty(&mut self) {
        self.metrics.batch_empty_total = self.metrics.batch_empty_total.saturating_add(1);
    }

    fn record_underflow(&mut self) {
        self.metrics.batch_underflow_total = self.metrics.batch_underflow_total.saturating_add(1);
    }

    fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.logs.push(LogRecord::new(level, COMPONENT, message));
    }
}

/// Monotonic batch counters.
#[derive(Debug, Default, Clone)]
pub struct SinkMetrics {
    pub batch_success_total: u64,
    pub batch_empty_total: u64,
    pub batch_underflow_total: u64,
}
