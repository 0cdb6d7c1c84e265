use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::config::UpstreamConfig;
use crate::relay::dto::ResultSubmission;

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream responded with status {0}")]
    Status(u16),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Outbound calls made by the relay handlers.
#[async_trait]
pub trait RelayClient: Send + Sync {
    /// Downloads the batch of encrypted strings.
    async fn fetch_encrypted(&self) -> Result<Vec<String>, UpstreamError>;
    /// Sends a batch of encrypted strings and returns their plain text, same order.
    async fn decrypt(&self, encrypted: &[String]) -> Result<Vec<String>, UpstreamError>;
    async fn submit_result(&self, payload: &ResultSubmission) -> Result<(), UpstreamError>;
}

pub struct HttpRelayClient {
    client: reqwest::Client,
    config: UpstreamConfig,
}

impl HttpRelayClient {
    pub fn new(config: UpstreamConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("cryptorelay/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Wraps an already configured `reqwest::Client`.
    pub fn with_client(client: reqwest::Client, config: UpstreamConfig) -> Self {
        Self { client, config }
    }

    fn ensure_ok(url: &str, status: StatusCode) -> Result<(), UpstreamError> {
        if status != StatusCode::OK {
            warn!(%url, %status, "upstream rejected request");
            return Err(UpstreamError::Status(status.as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl RelayClient for HttpRelayClient {
    async fn fetch_encrypted(&self) -> Result<Vec<String>, UpstreamError> {
        let url = &self.config.encrypted_data_url;
        let response = self.client.get(url).send().await?;
        Self::ensure_ok(url, response.status())?;
        let items: Vec<String> = response.json().await?;
        debug!(count = items.len(), "encrypted batch downloaded");
        Ok(items)
    }

    async fn decrypt(&self, encrypted: &[String]) -> Result<Vec<String>, UpstreamError> {
        let url = &self.config.decrypt_url;
        let response = self
            .client
            .post(url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .json(encrypted)
            .send()
            .await?;
        Self::ensure_ok(url, response.status())?;
        let items: Vec<String> = response.json().await?;
        debug!(sent = encrypted.len(), received = items.len(), "batch decrypted");
        Ok(items)
    }

    async fn submit_result(&self, payload: &ResultSubmission) -> Result<(), UpstreamError> {
        let url = &self.config.result_url;
        let response = self
            .client
            .post(url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .json(payload)
            .send()
            .await?;
        Self::ensure_ok(url, response.status())?;
        debug!(count = payload.result.len(), "result submitted");
        Ok(())
    }
}
