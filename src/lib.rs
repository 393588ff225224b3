//! Batched, transactional event-forwarding sink for tiered event-collection
//! pipelines: events are drained from a transactional channel in bounded
//! batches and forwarded to a downstream collector over a single
//! lazily-managed RPC connection, with at-least-once delivery semantics.

pub mod channel;
pub mod config;
pub mod connection;
pub mod event;
pub mod logging;
pub mod sink;
pub mod transport;

pub use channel::{Channel, ChannelError, TakeOutcome, Transaction};
pub use config::{ConfigError, Endpoint, SinkConfig, DEFAULT_BATCH_CAPACITY};
pub use connection::{
    ConnectionError, ConnectionFactory, ConnectionManager, ConnectionMetrics,
    ConnectionTelemetry, RpcConnection,
};
pub use event::Event;
pub use logging::{LogBuffer, LogLevel, LogRecord, LoggingError};
pub use sink::{DeliveryError, RelaySink, SinkMetrics, SinkStatus, SinkTelemetry};
pub use transport::{HttpBatchConnection, HttpConnectionFactory, WireEvent};
