//! Scripted in-memory backend for tests.
//!
//! Each call pops the next scripted reply; an optional gate lets a test hold a
//! reply back to force a specific interleaving.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use tokio::sync::oneshot;

use super::{FraudBackend, SampleStream, StreamCursor, TransportError};
use crate::logic::types::{
    BatchResponse, FeatureImportance, MetricSample, MetricsSnapshot, PredictResponse, SelectedFile,
    TicketResponse, TransactionPayload,
};

struct Reply<T> {
    gate: Option<oneshot::Receiver<()>>,
    result: Result<T, TransportError>,
}

type StreamScript = Result<Vec<Result<MetricSample, TransportError>>, TransportError>;
type StreamItem = (Option<String>, Result<MetricSample, TransportError>);

#[derive(Default)]
pub(crate) struct ScriptedBackend {
    predict: Mutex<VecDeque<Reply<PredictResponse>>>,
    metrics: Mutex<VecDeque<Reply<MetricsSnapshot>>>,
    batch: Mutex<VecDeque<Reply<BatchResponse>>>,
    ticket: Mutex<VecDeque<Reply<TicketResponse>>>,
    streams: Mutex<VecDeque<Result<Vec<StreamItem>, TransportError>>>,
    stream_cursors: Mutex<Vec<Option<String>>>,
    payloads: Mutex<Vec<TransactionPayload>>,
    calls: AtomicUsize,
    stream_opens: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_predict(&self, result: Result<PredictResponse, TransportError>) {
        self.predict.lock().push_back(Reply { gate: None, result });
    }

    pub fn push_predict_gated(&self, gate: oneshot::Receiver<()>, result: Result<PredictResponse, TransportError>) {
        self.predict.lock().push_back(Reply { gate: Some(gate), result });
    }

    pub fn push_metrics(&self, result: Result<MetricsSnapshot, TransportError>) {
        self.metrics.lock().push_back(Reply { gate: None, result });
    }

    pub fn push_batch(&self, result: Result<BatchResponse, TransportError>) {
        self.batch.lock().push_back(Reply { gate: None, result });
    }

    pub fn push_batch_gated(&self, gate: oneshot::Receiver<()>, result: Result<BatchResponse, TransportError>) {
        self.batch.lock().push_back(Reply { gate: Some(gate), result });
    }

    pub fn push_ticket(&self, result: Result<TicketResponse, TransportError>) {
        self.ticket.lock().push_back(Reply { gate: None, result });
    }

    pub fn push_ticket_gated(&self, gate: oneshot::Receiver<()>, result: Result<TicketResponse, TransportError>) {
        self.ticket.lock().push_back(Reply { gate: Some(gate), result });
    }

    pub fn push_stream(&self, script: StreamScript) {
        let script = script.map(|items| items.into_iter().map(|item| (None, item)).collect());
        self.streams.lock().push_back(script);
    }

    /// Stream whose events carry ids
    pub fn push_stream_with_ids(&self, items: Vec<(&str, Result<MetricSample, TransportError>)>) {
        let items = items
            .into_iter()
            .map(|(id, item)| (Some(id.to_string()), item))
            .collect();
        self.streams.lock().push_back(Ok(items));
    }

    /// Cursor value seen by each `open_stream` call
    pub fn stream_cursors(&self) -> Vec<Option<String>> {
        self.stream_cursors.lock().clone()
    }

    /// Network calls made, stream opens excluded
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn stream_opens(&self) -> usize {
        self.stream_opens.load(Ordering::SeqCst)
    }

    pub fn payloads(&self) -> Vec<TransactionPayload> {
        self.payloads.lock().clone()
    }

    async fn answer<T>(&self, queue: &Mutex<VecDeque<Reply<T>>>) -> Result<T, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = queue.lock().pop_front();

        match reply {
            Some(Reply { gate, result }) => {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                result
            }
            None => Err(TransportError::Network("no scripted reply".to_string())),
        }
    }
}

#[async_trait]
impl FraudBackend for ScriptedBackend {
    async fn predict(&self, payload: &TransactionPayload) -> Result<PredictResponse, TransportError> {
        self.payloads.lock().push(payload.clone());
        self.answer(&self.predict).await
    }

    async fn metrics(&self) -> Result<MetricsSnapshot, TransportError> {
        self.answer(&self.metrics).await
    }

    async fn batch(&self, _file: &SelectedFile) -> Result<BatchResponse, TransportError> {
        self.answer(&self.batch).await
    }

    async fn upload_ticket(&self, _file: &SelectedFile) -> Result<TicketResponse, TransportError> {
        self.answer(&self.ticket).await
    }

    async fn features(&self) -> Result<Vec<FeatureImportance>, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![FeatureImportance {
            name: "amount".to_string(),
            importance: 0.4,
        }])
    }

    async fn open_stream(&self, cursor: &StreamCursor) -> Result<SampleStream, TransportError> {
        self.stream_opens.fetch_add(1, Ordering::SeqCst);
        self.stream_cursors.lock().push(cursor.get());
        let script = self.streams.lock().pop_front();

        match script {
            Some(Ok(items)) => {
                let cursor = cursor.clone();
                Ok(Box::pin(stream::iter(items).map(move |(id, item)| {
                    if let Some(id) = id {
                        cursor.advance(id);
                    }
                    item
                })))
            }
            Some(Err(e)) => Err(e),
            None => Err(TransportError::Network("no scripted stream".to_string())),
        }
    }
}
