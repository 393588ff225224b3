use std::collections::BTreeMap;

/// Event record forwarded by the sink: an opaque body plus string headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Event {
    headers: BTreeMap<String, String>,
    body: Vec<u8>,
}

impl Event {
    /// Creates an event carrying the provided body and no headers.
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    /// Attaches a header, replacing any previous value for the same key.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Header map in key order.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Opaque payload bytes. Structure is owned by the producing channel.
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
