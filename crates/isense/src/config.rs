//! Client configuration.

use std::time::Duration;

use crate::error::{IsenseError, Result};

/// API root of the development server.
pub const DEFAULT_API_URL: &str = "http://rsense-dev.cs.uml.edu/api/v1";

/// Web root of the development server, used for project links.
pub const DEFAULT_WEB_URL: &str = "http://rsense-dev.cs.uml.edu";

/// Configuration for the iSENSE client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the JSON API (no trailing slash).
    pub api_url: String,

    /// Base URL of the website.
    pub web_url: String,

    /// Request timeout handed to the transport (None = no timeout).
    pub timeout: Option<Duration>,

    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            web_url: DEFAULT_WEB_URL.to_string(),
            timeout: Some(Duration::from_secs(60)),
            user_agent: format!("isense-rs/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from `ISENSE_API_URL`, `ISENSE_WEB_URL` and
    /// `ISENSE_TIMEOUT_SECS`, falling back to defaults for unset variables.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("ISENSE_API_URL") {
            config = config.with_api_url(url);
        }
        if let Ok(url) = std::env::var("ISENSE_WEB_URL") {
            config = config.with_web_url(url);
        }
        if let Ok(secs) = std::env::var("ISENSE_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                IsenseError::config(
                    "from_env",
                    format!("ISENSE_TIMEOUT_SECS is not a number: '{}'", secs),
                )
            })?;
            config.timeout = if secs == 0 {
                None
            } else {
                Some(Duration::from_secs(secs))
            };
        }

        Ok(config)
    }

    /// Set the API base URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = trim_slash(url.into());
        self
    }

    /// Set the website base URL.
    pub fn with_web_url(mut self, url: impl Into<String>) -> Self {
        self.web_url = trim_slash(url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Link to a project's page on the website.
    pub fn project_url(&self, project_id: &str) -> String {
        format!("{}/projects/{}", self.web_url, project_id)
    }
}

fn trim_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}
