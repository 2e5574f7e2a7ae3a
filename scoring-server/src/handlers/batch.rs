//! Batch scoring of an uploaded CSV

use axum::extract::{Multipart, State};
use axum::Json;

use super::read_upload;
use crate::extract::parse_batch;
use crate::models::BatchResponse;
use crate::{AppResult, AppState};

pub async fn score(State(state): State<AppState>, multipart: Multipart) -> AppResult<Json<BatchResponse>> {
    let (file_name, bytes) = read_upload(multipart).await?;
    let rows = parse_batch(&file_name, &bytes)?;

    let frauds_detected = rows
        .iter()
        .filter(|tx| state.scorer.is_fraud(state.scorer.probability(tx)))
        .count() as u64;

    tracing::info!(file = %file_name, rows = rows.len(), frauds_detected, "Batch scored");

    Ok(Json(BatchResponse { frauds_detected }))
}
