// # HTTP IP Source
//
// This crate discovers the current public address by asking a plain-text
// "what is my IP" service (ipify by default).
//
// ## Behavior
//
// - One GET per `current()` call, nothing cached between calls
// - The trimmed response body is handed back as-is; the reconciler
//   classifies it like any caller-supplied address
// - A non-2xx status or transport failure is an `Error::IpSource`

use ddns_core::config::IpSourceConfig;
use ddns_core::traits::IpSource;
use ddns_core::{Error, Result};
use std::time::Duration;

/// Default HTTP timeout for discovery requests (10 seconds)
pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP-based IP source
pub struct HttpIpSource {
    /// URL to fetch IP from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: URL to fetch the address from (e.g., "https://api64.ipify.org")
    /// - `timeout`: Per-request HTTP timeout
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(Error::config("HTTP IP source URL cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { url, client })
    }

    /// Create a source from its configuration section
    pub fn from_config(config: &IpSourceConfig) -> Result<Self> {
        config.validate()?;

        match config {
            IpSourceConfig::Http { url, timeout_secs } => {
                Self::new(url.clone(), Duration::from_secs(*timeout_secs))
            }
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<String> {
        tracing::debug!("Querying public IP from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::ip_source(format!("Request to {} failed: {}", self.url, e)))?;

        if !response.status().is_success() {
            return Err(Error::ip_source(format!(
                "{} answered with HTTP {}",
                self.url,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::ip_source(format!("Failed to read response: {}", e)))?;

        Ok(body.trim().to_string())
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}
