//! Batch Flow
//!
//! Gửi file (CSV) để chấm điểm hàng loạt và hiển thị số giao dịch gian lận.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{FlowError, FlowKind, RequestOutcome};
use crate::logic::transport::FraudBackend;
use crate::logic::types::SelectedFile;
use crate::logic::ui::{Alerts, BatchRegion, BatchView};

pub const SELECT_FILE_PROMPT: &str = "Select a file";
pub const BATCH_FAILED_MESSAGE: &str = "Batch scoring failed.";

pub struct BatchFlow {
    backend: Arc<dyn FraudBackend>,
    region: Arc<Mutex<BatchRegion>>,
    alerts: Alerts,
    next_seq: AtomicU64,
}

impl BatchFlow {
    pub fn new(backend: Arc<dyn FraudBackend>, alerts: Alerts) -> Self {
        Self {
            backend,
            region: Arc::new(Mutex::new(BatchRegion::default())),
            alerts,
            next_seq: AtomicU64::new(0),
        }
    }

    pub fn region(&self) -> BatchRegion {
        self.region.lock().clone()
    }

    pub async fn submit(&self, file: Option<&SelectedFile>) -> Result<RequestOutcome, FlowError> {
        let Some(file) = file else {
            self.alerts.push(SELECT_FILE_PROMPT);
            return Err(FlowError::Validation(SELECT_FILE_PROMPT.to_string()));
        };

        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.region.lock().begin(seq);
        let outcome = RequestOutcome::pending(FlowKind::Batch, seq);

        match self.backend.batch(file).await {
            Ok(result) => {
                let view = BatchView::Count(result.frauds_detected);
                let text = view.text();
                self.region.lock().complete(seq, view);
                log::info!("Batch #{} ({}): {}", seq, file.name, text);
                Ok(outcome.succeed(text))
            }
            Err(e) => {
                log::warn!("Batch #{} ({}) failed: {}", seq, file.name, e);
                self.region
                    .lock()
                    .complete(seq, BatchView::Error(BATCH_FAILED_MESSAGE.to_string()));
                Ok(outcome.fail(BATCH_FAILED_MESSAGE))
            }
        }
    }
}
