//! HTTP transport used by the client.
//!
//! The client only needs two verbs and raw bodies, so the transport is a small
//! trait. [`ReqwestClient`] is the real implementation; [`MockTransport`] replays
//! scripted responses for tests.

mod http;
mod mock;

use thiserror::Error;

pub use http::ReqwestClient;
pub(crate) use http::with_user_agent;
pub use mock::{MockTransport, RecordedRequest};

/// Request verb, as recorded by the mock transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// The transport could not produce a response at all.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Building the underlying client failed.
    #[error("failed to create HTTP client: {0}")]
    Setup(String),

    /// Connecting, sending, or reading the response failed.
    #[error("{0}")]
    Request(String),
}

/// Trait for HTTP transports.
///
/// Implementations must be thread-safe (Send + Sync) so a client can be moved
/// into a worker thread.
pub trait HttpClient: Send + Sync {
    /// Issue a GET request.
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, TransportError>;

    /// Issue a POST request with the given body.
    fn post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &[u8],
    ) -> Result<HttpResponse, TransportError>;
}
