use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Default maximum number of events forwarded per invocation.
pub const DEFAULT_BATCH_CAPACITY: usize = 100;

const HOSTNAME_KEY: &str = "hostname";
const PORT_KEY: &str = "port";
const BATCH_SIZE_KEY: &str = "batch-size";

/// Target address of the downstream collector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    hostname: String,
    port: u16,
}

impl Endpoint {
    /// Creates an endpoint, rejecting an empty hostname or port zero.
    pub fn new(hostname: impl Into<String>, port: u16) -> Result<Self, ConfigError> {
        let hostname = hostname.into();
        if hostname.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: HOSTNAME_KEY,
                reason: "hostname must not be empty".into(),
            });
        }
        if port == 0 {
            return Err(ConfigError::InvalidValue {
                key: PORT_KEY,
                reason: "port must be in 1..=65535".into(),
            });
        }
        Ok(Self { hostname, port })
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hostname, self.port)
    }
}

/// Sink configuration, validated at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    endpoint: Endpoint,
    batch_capacity: usize,
}

impl SinkConfig {
    /// Creates a configuration with the default batch capacity.
    pub fn new(hostname: impl Into<String>, port: u16) -> Result<Self, ConfigError> {
        Ok(Self {
            endpoint: Endpoint::new(hostname, port)?,
            batch_capacity: DEFAULT_BATCH_CAPACITY,
        })
    }

    /// Overrides the batch capacity. Zero is rejected.
    pub fn with_batch_capacity(mut self, capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: BATCH_SIZE_KEY,
                reason: "batch capacity must be at least 1".into(),
            });
        }
        self.batch_capacity = capacity;
        Ok(self)
    }

    /// Reads configuration from a JSON object with `hostname` (required),
    /// `port` (required) and `batch-size` (optional, default 100) keys.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let hostname = value
            .get(HOSTNAME_KEY)
            .ok_or(ConfigError::MissingKey(HOSTNAME_KEY))?
            .as_str()
            .ok_or_else(|| ConfigError::InvalidValue {
                key: HOSTNAME_KEY,
                reason: "hostname must be a string".into(),
            })?;
        let port = value
            .get(PORT_KEY)
            .ok_or(ConfigError::MissingKey(PORT_KEY))?
            .as_u64()
            .filter(|port| (1..=u64::from(u16::MAX)).contains(port))
            .ok_or_else(|| ConfigError::InvalidValue {
                key: PORT_KEY,
                reason: "port must be an integer in 1..=65535".into(),
            })?;
        let config = Self::new(hostname, port as u16)?;
        match value.get(BATCH_SIZE_KEY) {
            Some(raw) => {
                let capacity =
                    raw.as_u64()
                        .filter(|capacity| *capacity >= 1)
                        .ok_or_else(|| ConfigError::InvalidValue {
                            key: BATCH_SIZE_KEY,
                            reason: "batch size must be a positive integer".into(),
                        })?;
                config.with_batch_capacity(capacity as usize)
            }
            None => Ok(config),
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn hostname(&self) -> &str {
        self.endpoint.hostname()
    }

    pub fn port(&self) -> u16 {
        self.endpoint.port()
    }

    /// Maximum events collected per transaction scope.
    pub fn batch_capacity(&self) -> usize {
        self.batch_capacity
    }
}

/// Errors surfaced while validating sink configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no {0} specified")]
    MissingKey(&'static str),
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}
