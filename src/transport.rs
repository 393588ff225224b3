use crate::config::Endpoint;
use crate::connection::{ConnectionError, ConnectionFactory, RpcConnection};
use crate::Event;
use base64::{engine::general_purpose, Engine as _};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const BATCH_PATH: &str = "/v1/batch";
const CAPACITY_HINT_HEADER: &str = "x-evrelay-batch-capacity";

/// Blocking HTTP connection that forwards event batches to a downstream
/// collector and translates the response into the sink contract.
pub struct HttpBatchConnection {
    client: Client,
    batch_url: String,
    capacity_hint: usize,
    open: bool,
}

impl HttpBatchConnection {
    /// Builds a connection targeting `http://<hostname>:<port>/v1/batch`.
    pub fn connect(endpoint: &Endpoint, capacity_hint: usize) -> Result<Self, ConnectionError> {
        let client = Client::builder()
            .build()
            .map_err(|err| ConnectionError::new(format!("http client build failed: {err}")))?;
        Ok(Self {
            client,
            batch_url: format!(
                "http://{}:{}{}",
                endpoint.hostname(),
                endpoint.port(),
                BATCH_PATH
            ),
            capacity_hint,
            open: true,
        })
    }

    /// Full URL batches are posted to.
    pub fn batch_url(&self) -> &str {
        &self.batch_url
    }
}

impl RpcConnection for HttpBatchConnection {
    fn is_active(&self) -> bool {
        self.open
    }

    fn append_batch(&mut self, batch: &[Event]) -> Result<(), ConnectionError> {
        if !self.open {
            return Err(ConnectionError::new("connection is closed"));
        }
        let request = WireBatchRequest {
            events: batch.iter().map(WireEvent::from_event).collect(),
        };
        let response = self
            .client
            .post(&self.batch_url)
            .header(CAPACITY_HINT_HEADER, self.capacity_hint)
            .json(&request)
            .send()
            .map_err(|err| ConnectionError::new(format!("batch rpc failed: {err}")))?;
        if !response.status().is_success() {
            return Err(ConnectionError::new(format!(
                "batch rpc returned status {}",
                response.status()
            )));
        }
        let wire: WireBatchResponse = response
            .json()
            .map_err(|err| ConnectionError::new(format!("batch rpc decode failed: {err}")))?;
        if wire.accepted != batch.len() {
            return Err(ConnectionError::new(format!(
                "collector accepted {} of {} events; batches are all-or-nothing",
                wire.accepted,
                batch.len()
            )));
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), ConnectionError> {
        self.open = false;
        Ok(())
    }
}

/// Factory producing blocking HTTP connections for the sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpConnectionFactory;

impl ConnectionFactory for HttpConnectionFactory {
    fn connect(
        &self,
        endpoint: &Endpoint,
        capacity_hint: usize,
    ) -> Result<Box<dyn RpcConnection>, ConnectionError> {
        Ok(Box::new(HttpBatchConnection::connect(
            endpoint,
            capacity_hint,
        )?))
    }
}

/// Wire form of a single event. Field names are the collector contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireEvent {
    pub headers: BTreeMap<String, String>,
    pub body_b64: String,
}

impl WireEvent {
    /// Encodes an event for transmission.
    pub fn from_event(event: &Event) -> Self {
        Self {
            headers: event.headers().clone(),
            body_b64: general_purpose::STANDARD.encode(event.body()),
        }
    }

    /// Decodes the opaque body bytes.
    pub fn decode_body(&self) -> Result<Vec<u8>, ConnectionError> {
        general_purpose::STANDARD
            .decode(&self.body_b64)
            .map_err(|err| ConnectionError::new(format!("event body decode failed: {err}")))
    }
}

#[derive(Debug, Serialize)]
struct WireBatchRequest {
    events: Vec<WireEvent>,
}

#[derive(Debug, Deserialize)]
struct WireBatchResponse {
    accepted: usize,
}
