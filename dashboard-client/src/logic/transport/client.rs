//! Backend HTTP Client
//!
//! HTTP client for the fraud-scoring backend (JSON, multipart, SSE).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;

use super::error::TransportError;
use super::sse::{sample_stream, StreamCursor};
use super::{FraudBackend, SampleStream};
use crate::logic::types::{
    BatchResponse, FeatureImportance, MetricsSnapshot, PredictResponse, SelectedFile, TicketResponse,
    TransactionPayload,
};

/// Backend configuration
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    /// Applies to one-shot calls only, never to the stream
    pub timeout_seconds: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        use crate::constants;

        Self {
            base_url: constants::get_backend_url(),
            timeout_seconds: constants::get_timeout_secs(),
        }
    }
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }
}

/// reqwest-backed [`FraudBackend`]
pub struct HttpBackend {
    config: BackendConfig,
    http_client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(config: BackendConfig) -> Result<Self, TransportError> {
        // No client-wide timeout: it would also cut the long-lived stream
        let http_client = reqwest::Client::builder()
            .user_agent(format!("fraudwatch-client/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, http_client })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_seconds)
    }

    fn file_form(file: &SelectedFile) -> Form {
        let part = Part::bytes(file.bytes.clone()).file_name(file.name.clone());
        Form::new().part("file", part)
    }
}

/// Turn a response into `T`, mapping non-2xx and undecodable bodies to errors
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, TransportError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TransportError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| TransportError::Parse(e.to_string()))
}

#[async_trait]
impl FraudBackend for HttpBackend {
    async fn predict(&self, payload: &TransactionPayload) -> Result<PredictResponse, TransportError> {
        let response = self
            .http_client
            .post(self.url("/predict"))
            .timeout(self.timeout())
            .json(payload)
            .send()
            .await?;

        let result: PredictResponse = decode(response).await?;
        result.check().map_err(TransportError::Malformed)?;

        if let Some(id) = result.transaction_id {
            log::debug!("Prediction stored as transaction {}", id);
        }
        Ok(result)
    }

    async fn metrics(&self) -> Result<MetricsSnapshot, TransportError> {
        let response = self
            .http_client
            .get(self.url("/metrics"))
            .timeout(self.timeout())
            .send()
            .await?;

        let snapshot: MetricsSnapshot = decode(response).await?;
        snapshot.check().map_err(TransportError::Malformed)?;
        Ok(snapshot)
    }

    async fn batch(&self, file: &SelectedFile) -> Result<BatchResponse, TransportError> {
        log::info!("Uploading batch file {} ({} bytes)", file.name, file.bytes.len());

        let response = self
            .http_client
            .post(self.url("/batch"))
            .timeout(self.timeout())
            .multipart(Self::file_form(file))
            .send()
            .await?;

        decode(response).await
    }

    async fn upload_ticket(&self, file: &SelectedFile) -> Result<TicketResponse, TransportError> {
        log::info!("Uploading ticket {} ({} bytes)", file.name, file.bytes.len());

        let response = self
            .http_client
            .post(self.url("/upload_ticket"))
            .timeout(self.timeout())
            .multipart(Self::file_form(file))
            .send()
            .await?;

        let result: TicketResponse = decode(response).await?;
        result.check().map_err(TransportError::Malformed)?;
        Ok(result)
    }

    async fn features(&self) -> Result<Vec<FeatureImportance>, TransportError> {
        let response = self
            .http_client
            .get(self.url("/features"))
            .timeout(self.timeout())
            .send()
            .await?;

        decode(response).await
    }

    async fn open_stream(&self, cursor: &StreamCursor) -> Result<SampleStream, TransportError> {
        let mut request = self
            .http_client
            .get(self.url("/stream"))
            .header(reqwest::header::ACCEPT, "text/event-stream");
        let resume = cursor.get();
        if let Some(id) = &resume {
            request = request.header("Last-Event-ID", id.as_str());
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        log::info!(
            "Stream connected: {} (after event {:?})",
            self.url("/stream"),
            resume
        );
        Ok(sample_stream(response.bytes_stream(), cursor.clone()))
    }
}
