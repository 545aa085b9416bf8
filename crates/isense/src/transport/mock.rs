//! Scripted transport for testing.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::Value;

use super::{HttpClient, HttpResponse, Method, TransportError};

/// A request captured by [`MockTransport`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl RecordedRequest {
    /// Look up a header value (case-insensitive name).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Parse the request body as JSON.
    pub fn body_json(&self) -> Option<Value> {
        self.body
            .as_ref()
            .and_then(|b| serde_json::from_slice(b).ok())
    }
}

enum Scripted {
    Response(HttpResponse),
    Failure(String),
}

/// Transport that replays queued responses in order and records every request.
///
/// When the queue runs dry, requests fail with a transport error.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    /// Create an empty mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with a raw body.
    pub fn respond(&self, status: u16, body: impl Into<String>) -> &Self {
        let body: String = body.into();
        self.push(Scripted::Response(HttpResponse::new(status, body.into_bytes())))
    }

    /// Queue a response with a JSON body.
    pub fn respond_json(&self, status: u16, body: Value) -> &Self {
        self.respond(status, body.to_string())
    }

    /// Queue a transport-level failure.
    pub fn fail(&self, message: impl Into<String>) -> &Self {
        self.push(Scripted::Failure(message.into()))
    }

    /// All requests seen so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests
            .lock()
            .ok()
            .and_then(|r| r.last().cloned())
    }

    /// Number of queued responses not yet consumed.
    pub fn pending(&self) -> usize {
        self.responses.lock().map(|r| r.len()).unwrap_or(0)
    }

    fn push(&self, scripted: Scripted) -> &Self {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(scripted);
        }
        self
    }

    fn record(
        &self,
        method: Method,
        url: &str,
        headers: &[(&str, &str)],
        body: Option<&[u8]>,
    ) -> Result<HttpResponse, TransportError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(RecordedRequest {
                method,
                url: url.to_string(),
                headers: headers
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                body: body.map(<[u8]>::to_vec),
            });
        }

        let next = self
            .responses
            .lock()
            .map_err(|_| TransportError::Request("mock transport poisoned".to_string()))?
            .pop_front();

        match next {
            Some(Scripted::Response(response)) => Ok(response),
            Some(Scripted::Failure(message)) => Err(TransportError::Request(message)),
            None => Err(TransportError::Request(format!(
                "no scripted response for {:?} {}",
                method, url
            ))),
        }
    }
}

impl HttpClient for MockTransport {
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, TransportError> {
        self.record(Method::Get, url, headers, None)
    }

    fn post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &[u8],
    ) -> Result<HttpResponse, TransportError> {
        self.record(Method::Post, url, headers, Some(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_replays_in_order() {
        let mock = MockTransport::new();
        mock.respond(200, "first").respond(404, "second");

        let a = mock.get("http://x/a", &[]).unwrap();
        let b = mock.get("http://x/b", &[]).unwrap();

        assert_eq!(a.body, b"first");
        assert_eq!(b.status, 404);
        assert_eq!(mock.pending(), 0);
    }

    #[test]
    fn test_empty_queue_is_transport_error() {
        let mock = MockTransport::new();
        let err = mock.get("http://x/a", &[]).unwrap_err();
        assert!(err.to_string().contains("no scripted response"));
        assert_eq!(mock.request_count(), 1);
    }

    #[test]
    fn test_records_post_body_and_headers() {
        let mock = MockTransport::new();
        mock.respond_json(200, json!({"id": 5}));

        mock.post(
            "http://x/upload",
            &[("Content-Type", "application/json")],
            br#"{"title":"T"}"#,
        )
        .unwrap();

        let req = mock.last_request().unwrap();
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.body_json(), Some(json!({"title": "T"})));
    }

    #[test]
    fn test_scripted_failure() {
        let mock = MockTransport::new();
        mock.fail("connection refused");
        let err = mock.post("http://x", &[], b"").unwrap_err();
        assert_eq!(err.to_string(), "connection refused");
    }
}
