//! Flows - Independent request/response cycles
//!
//! Mỗi flow (predict, batch, ticket) render vào vùng UI riêng và tự xử lý lỗi
//! của mình; lỗi ở flow này không ảnh hưởng flow khác.

pub mod batch;
pub mod prediction;
pub mod ticket;
pub mod verdict;

pub use batch::BatchFlow;
pub use prediction::PredictionFlow;
pub use ticket::TicketFlow;

use serde::Serialize;

use super::transport::TransportError;

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// Rejected locally, no network call was made
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FlowKind {
    Predict,
    Batch,
    Ticket,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutcomeStatus {
    Pending,
    Success,
    Failure,
}

/// Transient result of one flow invocation; discarded after render
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestOutcome {
    pub kind: FlowKind,
    pub seq: u64,
    pub status: OutcomeStatus,
    pub message: String,
}

impl RequestOutcome {
    pub fn pending(kind: FlowKind, seq: u64) -> Self {
        Self {
            kind,
            seq,
            status: OutcomeStatus::Pending,
            message: String::new(),
        }
    }

    pub fn succeed(self, message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Success,
            message: message.into(),
            ..self
        }
    }

    pub fn fail(self, message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Failure,
            message: message.into(),
            ..self
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}
