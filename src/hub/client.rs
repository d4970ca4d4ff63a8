//! HTTP client for polling the hub's status endpoints

use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::HubConfig;

const STATUS_PATH: &str = "/status";
const QUEUE_PATH: &str = "/se/grid/newsessionqueue/queue";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("connection timeout")]
    Timeout,

    #[error("HTTP {0}")]
    Http(u16),
}

pub type Result<T> = std::result::Result<T, FetchError>;

/// Fetcher for the two hub documents a collection cycle reads.
///
/// Exactly one attempt per call: a scrape must reflect the hub as it is
/// right now, so there is no retry or backoff here.
pub struct HubClient {
    client: Client,
    base_url: String,
}

impl HubClient {
    /// Create a new client for the configured hub
    pub fn new(config: &HubConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("grid-exporter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url(),
        })
    }

    /// GET `{hub}/status`
    pub async fn status(&self) -> Result<Bytes> {
        self.get(STATUS_PATH).await
    }

    /// GET `{hub}/se/grid/newsessionqueue/queue`
    pub async fn queue(&self) -> Result<Bytes> {
        self.get(QUEUE_PATH).await
    }

    async fn get(&self, path: &str) -> Result<Bytes> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "fetching hub endpoint");

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Request(e.to_string())
            }
        })?;

        // Non-2xx counts as a transport failure, same as an unreachable hub
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        debug!(%url, size = bytes.len(), "fetch completed");

        Ok(bytes)
    }
}
