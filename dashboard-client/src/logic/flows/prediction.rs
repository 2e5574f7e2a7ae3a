//! Prediction Flow
//!
//! Idle → Submitting → (Success | Failure) → Idle.
//! Kết quả thành công được broadcast tới dashboard giống như một sample của stream.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::verdict::VerdictView;
use super::{FlowError, FlowKind, RequestOutcome};
use crate::logic::dashboard::PredictionBus;
use crate::logic::transport::FraudBackend;
use crate::logic::types::{PredictResponse, TransactionPayload};
use crate::logic::ui::{ResultRegion, ResultView};

pub struct PredictionFlow {
    backend: Arc<dyn FraudBackend>,
    region: Arc<Mutex<ResultRegion>>,
    bus: PredictionBus,
    next_seq: AtomicU64,
}

impl PredictionFlow {
    pub fn new(backend: Arc<dyn FraudBackend>, bus: PredictionBus) -> Self {
        Self {
            backend,
            region: Arc::new(Mutex::new(ResultRegion::default())),
            bus,
            next_seq: AtomicU64::new(0),
        }
    }

    /// Copy of what the result region currently shows
    pub fn region(&self) -> ResultRegion {
        self.region.lock().clone()
    }

    /// Submit the transaction form.
    ///
    /// Transport failures render inline and come back as a `Failure` outcome;
    /// `Err` is only returned for a form that could not be serialized.
    pub async fn submit<K, V>(&self, fields: &[(K, V)]) -> Result<RequestOutcome, FlowError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.region.lock().begin(seq);
        let outcome = RequestOutcome::pending(FlowKind::Predict, seq);

        let payload = match TransactionPayload::from_form(fields) {
            Ok(payload) => payload,
            Err(e) => {
                self.region.lock().complete(seq, ResultView::Error(e.to_string()));
                return Err(FlowError::Validation(e.to_string()));
            }
        };

        log::info!("Prediction #{} submitted ({} fields)", seq, payload.len());

        match self.call(&payload).await {
            Ok(response) => {
                let view = VerdictView::new(response.is_fraud, response.fraud_probability);
                let text = view.text.clone();

                if !self.region.lock().complete(seq, ResultView::Verdict(view)) {
                    log::debug!("Prediction #{} superseded, result not rendered", seq);
                }

                // The point is real data even when its render was superseded
                self.bus.broadcast(response.new_point);

                log::info!("Prediction #{}: {}", seq, text);
                Ok(outcome.succeed(text))
            }
            Err(e) => {
                let message = format!("Prediction failed: {}", e);
                log::warn!("Prediction #{} failed: {}", seq, e);

                if !self.region.lock().complete(seq, ResultView::Error(message.clone())) {
                    log::debug!("Prediction #{} superseded, error not rendered", seq);
                }
                Ok(outcome.fail(message))
            }
        }
    }

    async fn call(&self, payload: &TransactionPayload) -> Result<PredictResponse, FlowError> {
        Ok(self.backend.predict(payload).await?)
    }
}
