//! Prediction log
//!
//! In-memory append-only record of every scored transaction. `/metrics` reads a
//! time range and reports the id it stopped at, `/stream` tails it by id.

use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use tokio::sync::RwLock;

/// Timestamp format of every point handed to the dashboard
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

pub fn isoformat(at: &NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRecord {
    /// 1-based, strictly increasing
    pub id: i64,
    pub timestamp: NaiveDateTime,
    pub is_fraud: bool,
    pub fraud_probability: f64,
}

impl PredictionRecord {
    pub fn timestamp_label(&self) -> String {
        isoformat(&self.timestamp)
    }
}

#[derive(Clone, Default)]
pub struct PredictionLog {
    records: Arc<RwLock<Vec<PredictionRecord>>>,
}

impl PredictionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a prediction stamped with the current UTC time
    pub async fn record(&self, is_fraud: bool, fraud_probability: f64) -> PredictionRecord {
        self.record_at(Utc::now(), is_fraud, fraud_probability).await
    }

    pub async fn record_at(
        &self,
        at: DateTime<Utc>,
        is_fraud: bool,
        fraud_probability: f64,
    ) -> PredictionRecord {
        let mut records = self.records.write().await;

        let record = PredictionRecord {
            id: records.len() as i64 + 1,
            timestamp: at.naive_utc(),
            is_fraud,
            fraud_probability,
        };
        records.push(record.clone());
        record
    }

    /// Records at or after `since`
    pub async fn since(&self, since: NaiveDateTime) -> Vec<PredictionRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| r.timestamp >= since)
            .cloned()
            .collect()
    }

    /// Records at or after `since` together with the last id, under one lock so
    /// a stream resuming after that id neither misses nor repeats a record
    pub async fn snapshot_since(&self, since: NaiveDateTime) -> (Vec<PredictionRecord>, i64) {
        let records = self.records.read().await;
        let recent = records.iter().filter(|r| r.timestamp >= since).cloned().collect();
        (recent, records.len() as i64)
    }

    /// Records with an id greater than `id`, oldest first
    pub async fn after(&self, id: i64) -> Vec<PredictionRecord> {
        let records = self.records.read().await;
        // ids are positions + 1
        let start = id.clamp(0, records.len() as i64) as usize;
        records[start..].to_vec()
    }

    pub async fn last_id(&self) -> i64 {
        self.records.read().await.len() as i64
    }
}
