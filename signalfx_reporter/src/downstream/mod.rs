//! Types related to delivering datapoints to SignalFx

use bytes::Bytes;
use futures::future::BoxFuture;

mod http_transport;

pub use http_transport::{default_trust, HttpTransport};

/// Errors from a transport are opaque to the reporter; they're logged and handed to your callback.
pub type StdError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// One POST to the ingest endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRequest {
    /// Path and query, relative to the endpoint host
    pub path: String,
    /// Header name/value pairs
    pub headers: Vec<(&'static str, String)>,
    /// The serialized batch
    pub body: Bytes,
}

impl DeliveryRequest {
    /// The value of a header, if present
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header, _)| header.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A way to get a request to SignalFx.
///
/// Success means the endpoint accepted the request. Timeouts are the
/// transport's business.
pub trait Transport: Send + Sync {
    /// Send one request
    fn post(&self, request: DeliveryRequest) -> BoxFuture<'_, Result<(), StdError>>;
}
