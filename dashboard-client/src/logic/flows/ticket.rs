//! Ticket Flow
//!
//! Gửi ảnh/ticket hoặc hóa đơn, hiển thị kết quả dạng chat transcript.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::verdict::{verdict_text, VerdictStyle};
use super::{FlowError, FlowKind, RequestOutcome};
use crate::logic::transport::FraudBackend;
use crate::logic::types::SelectedFile;
use crate::logic::ui::{Alerts, Role, Transcript};

pub const SELECT_TICKET_PROMPT: &str = "Select a ticket or invoice";
pub const TICKET_FAILED_MESSAGE: &str = "Error processing the ticket.";

pub struct TicketFlow {
    backend: Arc<dyn FraudBackend>,
    transcript: Arc<Mutex<Transcript>>,
    alerts: Alerts,
    next_seq: AtomicU64,
}

impl TicketFlow {
    pub fn new(backend: Arc<dyn FraudBackend>, alerts: Alerts) -> Self {
        Self {
            backend,
            transcript: Arc::new(Mutex::new(Transcript::default())),
            alerts,
            next_seq: AtomicU64::new(0),
        }
    }

    pub fn transcript(&self) -> Transcript {
        self.transcript.lock().clone()
    }

    pub async fn submit(&self, file: Option<&SelectedFile>) -> Result<RequestOutcome, FlowError> {
        let Some(file) = file else {
            self.alerts.push(SELECT_TICKET_PROMPT);
            return Err(FlowError::Validation(SELECT_TICKET_PROMPT.to_string()));
        };

        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let outcome = RequestOutcome::pending(FlowKind::Ticket, seq);

        self.transcript
            .lock()
            .append(Role::User, format!("Sending {}…", file.name));

        match self.backend.upload_ticket(file).await {
            Ok(result) => {
                let text = verdict_text(result.is_fraud, result.fraud_probability, VerdictStyle::Chat);
                self.transcript.lock().append(Role::Bot, text.clone());
                log::info!("Ticket #{} ({}): {}", seq, file.name, text);
                Ok(outcome.succeed(text))
            }
            Err(e) => {
                log::warn!("Ticket #{} ({}) failed: {}", seq, file.name, e);
                self.transcript.lock().append(Role::Bot, TICKET_FAILED_MESSAGE);
                Ok(outcome.fail(TICKET_FAILED_MESSAGE))
            }
        }
    }
}
