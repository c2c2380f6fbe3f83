// weather-server/src/plugins/weather/client.rs
use crate::config::NwsConfig;
use futures::future::BoxFuture;
use reqwest::{header::ACCEPT, Client};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Failures the fetcher does not turn into an absent result.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },
    #[error("invalid JSON from {url}: {source}")]
    Decode { url: String, source: reqwest::Error },
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        match self {
            FetchError::Client(e) => e.is_timeout(),
            FetchError::Request { source, .. } | FetchError::Decode { source, .. } => {
                source.is_timeout()
            }
        }
    }
}

/// Where alert documents come from.
///
/// `Ok(None)` means the upstream answered with an HTTP error status.
pub trait AlertSource: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Option<Value>, FetchError>>;
}

/// Fetcher for the National Weather Service API.
pub struct NwsClient {
    config: NwsConfig,
}

impl NwsClient {
    pub fn new(config: NwsConfig) -> Self {
        NwsClient { config }
    }

    /// One GET with the NWS headers. The client lives only for this call.
    pub async fn fetch_json(&self, url: &str) -> Result<Option<Value>, FetchError> {
        let client = Client::builder()
            .user_agent(self.config.user_agent.as_str())
            .timeout(self.config.timeout())
            .build()
            .map_err(FetchError::Client)?;

        debug!("GET {}", url);
        let response = client
            .get(url)
            .header(ACCEPT, self.config.accept.as_str())
            .send()
            .await
            .map_err(|source| FetchError::Request { url: url.to_string(), source })?;

        let response = match response.error_for_status() {
            Ok(response) => response,
            Err(e) => {
                warn!("HTTP error occurred: {}", e);
                return Ok(None);
            }
        };

        let body = response
            .json::<Value>()
            .await
            .map_err(|source| FetchError::Decode { url: url.to_string(), source })?;
        Ok(Some(body))
    }
}

impl AlertSource for NwsClient {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Option<Value>, FetchError>> {
        Box::pin(self.fetch_json(url))
    }
}
