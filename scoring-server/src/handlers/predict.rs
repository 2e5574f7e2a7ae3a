//! Single transaction scoring

use axum::{extract::State, Json};
use serde_json::Value;

use crate::models::{PredictResponse, StreamPoint};
use crate::scorer::Transaction;
use crate::{AppError, AppResult, AppState};

/// Score one transaction and append it to the prediction log
pub async fn predict(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> AppResult<Json<PredictResponse>> {
    let fields = body
        .as_object()
        .ok_or_else(|| AppError::ValidationError("expected a JSON object".to_string()))?;

    let tx = Transaction::from_json(fields);
    let probability = state.scorer.probability(&tx);
    let is_fraud = state.scorer.is_fraud(probability);

    let record = state.log.record(is_fraud, probability).await;

    tracing::debug!(
        id = record.id,
        kind = %tx.kind,
        probability,
        is_fraud,
        "Transaction scored"
    );

    Ok(Json(PredictResponse {
        is_fraud,
        fraud_probability: probability,
        transaction_id: record.id,
        new_point: StreamPoint {
            timestamp: record.timestamp_label(),
            fraud_probability: probability,
        },
    }))
}
