//! Blocking reqwest transport.

use reqwest::blocking::{Client, RequestBuilder};

use crate::config::ClientConfig;

use super::{HttpClient, HttpResponse, TransportError};

/// Transport backed by `reqwest::blocking::Client`.
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    /// Create a transport honoring the timeout in `config`.
    ///
    /// The user agent is added to each request by the client.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::Setup(e.to_string()))?;

        Ok(Self { client })
    }

    fn execute(
        &self,
        request: RequestBuilder,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, TransportError> {
        let request = headers
            .iter()
            .fold(request, |req, (name, value)| req.header(*name, *value));

        let response = request
            .send()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|e| TransportError::Request(format!("failed to read response body: {}", e)))?;

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, TransportError> {
        self.execute(self.client.get(url), headers)
    }

    fn post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &[u8],
    ) -> Result<HttpResponse, TransportError> {
        self.execute(self.client.post(url).body(body.to_vec()), headers)
    }
}

/// Attach the configured user agent to a header list.
pub(crate) fn with_user_agent<'a>(
    headers: &[(&'a str, &'a str)],
    user_agent: &'a str,
) -> Vec<(&'a str, &'a str)> {
    let mut all = Vec::with_capacity(headers.len() + 1);
    all.push(("User-Agent", user_agent));
    all.extend_from_slice(headers);
    all
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_goes_first() {
        let headers = with_user_agent(&[("Accept", "application/json")], "isense-rs/0.1.0");
        assert_eq!(headers[0], ("User-Agent", "isense-rs/0.1.0"));
        assert_eq!(headers[1], ("Accept", "application/json"));
    }

    #[test]
    fn test_build_with_and_without_timeout() {
        assert!(ReqwestClient::new(&ClientConfig::default()).is_ok());
        assert!(ReqwestClient::new(&ClientConfig::default().with_timeout(None)).is_ok());
    }
}
