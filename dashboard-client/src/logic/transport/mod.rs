//! Transport Adapter - Backend communication
//!
//! Bọc các lời gọi HTTP one-shot và stream SSE tới backend; không chứa business logic.

pub mod client;
pub mod error;
pub mod sse;
pub mod stream;

#[cfg(test)]
pub(crate) mod fake;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

pub use client::{BackendConfig, HttpBackend};
pub use error::TransportError;
pub use sse::StreamCursor;
pub use stream::{ReconnectPolicy, StreamStats, StreamSubscription};

use super::types::{
    BatchResponse, FeatureImportance, MetricSample, MetricsSnapshot, PredictResponse, SelectedFile,
    TicketResponse, TransactionPayload,
};

/// Live samples in arrival order
pub type SampleStream = Pin<Box<dyn Stream<Item = Result<MetricSample, TransportError>> + Send>>;

/// The scoring backend as seen by the client.
///
/// Implementations validate response shape before returning, so callers can
/// trust probabilities to be inside [0, 1].
#[async_trait]
pub trait FraudBackend: Send + Sync {
    async fn predict(&self, payload: &TransactionPayload) -> Result<PredictResponse, TransportError>;

    async fn metrics(&self) -> Result<MetricsSnapshot, TransportError>;

    async fn batch(&self, file: &SelectedFile) -> Result<BatchResponse, TransportError>;

    async fn upload_ticket(&self, file: &SelectedFile) -> Result<TicketResponse, TransportError>;

    async fn features(&self) -> Result<Vec<FeatureImportance>, TransportError>;

    /// Open one connection of the server-push stream.
    ///
    /// Resumes after the cursor's event id when it holds one; the returned
    /// stream advances the cursor as events are consumed.
    async fn open_stream(&self, cursor: &StreamCursor) -> Result<SampleStream, TransportError>;
}
