//! Wire models

use serde::{Deserialize, Serialize};

/// Point appended to the dashboard charts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreamPoint {
    pub timestamp: String,
    pub fraud_probability: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub is_fraud: bool,
    pub fraud_probability: f64,
    pub transaction_id: i64,
    pub new_point: StreamPoint,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentMetrics {
    pub fraud_rate: f64,
    pub txn_per_hour: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    pub timestamp: String,
    pub avg_fraud_probability: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsResponse {
    pub current: CurrentMetrics,
    pub history: Vec<HistoryPoint>,
    /// Id of the newest record included; `/stream` resumes after it
    pub last_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    pub frauds_detected: u64,
}

/// Ticket verdicts are not recorded in the log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketResponse {
    pub is_fraud: bool,
    pub fraud_probability: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub name: String,
    pub importance: f64,
}
