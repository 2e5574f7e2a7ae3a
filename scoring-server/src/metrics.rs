//! Dashboard metrics over the prediction log

use std::collections::BTreeMap;

use chrono::{NaiveDateTime, Timelike};

use crate::models::{CurrentMetrics, HistoryPoint, MetricsResponse};
use crate::store::PredictionRecord;

const HOUR_FORMAT: &str = "%Y-%m-%dT%H:00:00";

fn hour_of(at: &NaiveDateTime) -> NaiveDateTime {
    at.date()
        .and_hms_opt(at.hour(), 0, 0)
        .unwrap_or(*at)
}

/// Fraud rate, mean transactions per active hour, and the hourly mean
/// probability series (oldest hour first). `last_id` is the log position the
/// records were read at.
pub fn summarize(records: &[PredictionRecord], last_id: i64) -> MetricsResponse {
    if records.is_empty() {
        return MetricsResponse {
            current: CurrentMetrics {
                fraud_rate: 0.0,
                txn_per_hour: 0.0,
            },
            history: Vec::new(),
            last_id,
        };
    }

    let total = records.len() as f64;
    let frauds = records.iter().filter(|r| r.is_fraud).count() as f64;

    // hour -> (count, probability sum)
    let mut buckets: BTreeMap<NaiveDateTime, (u64, f64)> = BTreeMap::new();
    for r in records {
        let entry = buckets.entry(hour_of(&r.timestamp)).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += r.fraud_probability;
    }

    let history = buckets
        .iter()
        .map(|(hour, (count, sum))| HistoryPoint {
            timestamp: hour.format(HOUR_FORMAT).to_string(),
            avg_fraud_probability: sum / *count as f64,
        })
        .collect();

    MetricsResponse {
        current: CurrentMetrics {
            fraud_rate: frauds / total,
            txn_per_hour: total / buckets.len() as f64,
        },
        history,
        last_id,
    }
}
