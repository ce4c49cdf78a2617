use crate::error::FetchError;
use anyhow::{Context, Result};
use std::time::Duration;

/// Browser-like user agent; the adoption site serves reduced markup to
/// unknown clients.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// HTTP settings shared by all stages.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub user_agent: String,
    /// Upper bound for a whole request, body included.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Pause before each request, for basic politeness toward the site.
    pub delay: Duration,
    pub max_idle_per_host: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            delay: Duration::ZERO,
            max_idle_per_host: 10,
        }
    }
}

/// The one HTTP client of a run. Built once from [`ClientConfig`] and passed
/// explicitly to every stage; `reqwest::Client` is internally reference
/// counted, so clones share the connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    delay: Duration,
}

impl Fetcher {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.max_idle_per_host)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            delay: config.delay,
        })
    }

    /// Fetch a page and return its body as text. Non-2xx is an error.
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.send(url).await?;
        response
            .text()
            .await
            .map_err(|err| FetchError::request(url, err))
    }

    /// Fetch a binary resource (a photo). Non-2xx is an error.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.send(url).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|err| FetchError::request(url, err))?;
        Ok(bytes.to_vec())
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        tracing::debug!(url = %url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| FetchError::request(url, err))?;

        let status = response.status();
        tracing::trace!(url = %url, status = %status, "Response");
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(response)
    }
}
