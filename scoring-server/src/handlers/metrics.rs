use axum::{extract::State, Json};
use chrono::{Duration, Utc};

use crate::models::MetricsResponse;
use crate::{metrics, AppState};

/// Summary and hourly history over the configured lookback
pub async fn get(State(state): State<AppState>) -> Json<MetricsResponse> {
    let since = (Utc::now() - Duration::hours(state.config.metrics_window_hours)).naive_utc();
    let (records, last_id) = state.log.snapshot_since(since).await;

    Json(metrics::summarize(&records, last_id))
}
