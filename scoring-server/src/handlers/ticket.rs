//! Ticket / invoice scanning

use axum::extract::{Multipart, State};
use axum::Json;

use super::read_upload;
use crate::models::TicketResponse;
use crate::{AppResult, AppState};

pub async fn upload(State(state): State<AppState>, multipart: Multipart) -> AppResult<Json<TicketResponse>> {
    let (file_name, bytes) = read_upload(multipart).await?;
    let tx = state.tickets.parse_upload(&bytes)?;

    let fraud_probability = state.scorer.probability(&tx);
    let is_fraud = state.scorer.is_fraud(fraud_probability);

    tracing::info!(file = %file_name, kind = %tx.kind, fraud_probability, "Ticket scanned");

    Ok(Json(TicketResponse {
        is_fraud,
        fraud_probability,
    }))
}
