//! Shared Data Types
//!
//! Kiểu dữ liệu dùng chung giữa transport, dashboard và các flow.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// METRIC SAMPLE
// ============================================================================

/// A timestamped fraud-probability observation.
///
/// Produced by the live stream or by a completed prediction. Fields are private
/// so a sample cannot change once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSample")]
pub struct MetricSample {
    timestamp: String,
    fraud_probability: f64,
}

/// Wire shape: live points send `fraud_probability`, history buckets send
/// `avgFraudProbability`, some servers send `fraudProbability`. When several
/// are present the first in that order wins.
#[derive(Deserialize)]
struct RawSample {
    #[serde(deserialize_with = "label_from_any")]
    timestamp: String,
    fraud_probability: Option<f64>,
    #[serde(rename = "fraudProbability")]
    fraud_probability_camel: Option<f64>,
    #[serde(rename = "avgFraudProbability")]
    avg_fraud_probability: Option<f64>,
}

impl TryFrom<RawSample> for MetricSample {
    type Error = String;

    fn try_from(raw: RawSample) -> Result<Self, Self::Error> {
        let fraud_probability = raw
            .fraud_probability
            .or(raw.fraud_probability_camel)
            .or(raw.avg_fraud_probability)
            .ok_or_else(|| format!("sample '{}' has no fraud probability", raw.timestamp))?;

        Ok(Self {
            timestamp: raw.timestamp,
            fraud_probability,
        })
    }
}

impl MetricSample {
    pub fn new(timestamp: impl Into<String>, fraud_probability: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            fraud_probability,
        }
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn fraud_probability(&self) -> f64 {
        self.fraud_probability
    }

    /// Probability must be finite and inside [0, 1]
    pub fn check(&self) -> Result<(), String> {
        check_probability(self.fraud_probability)
            .map_err(|e| format!("sample '{}': {}", self.timestamp, e))
    }
}

pub(crate) fn check_probability(p: f64) -> Result<(), String> {
    if p.is_finite() && (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(format!("fraud probability {} outside [0, 1]", p))
    }
}

/// Timestamps are opaque labels; the backend sends strings for live points
/// but history buckets may arrive as numbers.
fn label_from_any<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawLabel {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match RawLabel::deserialize(deserializer)? {
        RawLabel::Text(s) => s,
        RawLabel::Int(n) => n.to_string(),
        RawLabel::Float(f) => f.to_string(),
    })
}

// ============================================================================
// BACKEND RESPONSES
// ============================================================================

/// Current aggregate figures for the metrics box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentMetrics {
    pub fraud_rate: f64,
    pub txn_per_hour: f64,
}

impl CurrentMetrics {
    pub fn fraud_rate_text(&self) -> String {
        format!("Fraud rate: {:.2}%", self.fraud_rate * 100.0)
    }

    pub fn txn_per_hour_text(&self) -> String {
        format!("Txns/hour: {:.1}", self.txn_per_hour)
    }
}

/// `GET /metrics`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub current: CurrentMetrics,
    pub history: Vec<MetricSample>,
    /// Last stream event id the snapshot covers; the stream resumes after it
    #[serde(default, alias = "lastId", skip_serializing_if = "Option::is_none")]
    pub last_id: Option<i64>,
}

impl MetricsSnapshot {
    /// Empty snapshot, used when the initial fetch fails
    pub fn empty() -> Self {
        Self {
            current: CurrentMetrics {
                fraud_rate: 0.0,
                txn_per_hour: 0.0,
            },
            history: Vec::new(),
            last_id: None,
        }
    }

    pub fn check(&self) -> Result<(), String> {
        self.history.iter().try_for_each(MetricSample::check)
    }
}

/// `POST /predict`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub is_fraud: bool,
    pub fraud_probability: f64,
    pub new_point: MetricSample,
    #[serde(default)]
    pub transaction_id: Option<i64>,
}

impl PredictResponse {
    pub fn check(&self) -> Result<(), String> {
        check_probability(self.fraud_probability)?;
        self.new_point.check()
    }
}

/// `POST /batch`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub frauds_detected: u64,
}

/// `POST /upload_ticket`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketResponse {
    pub is_fraud: bool,
    pub fraud_probability: f64,
}

impl TicketResponse {
    pub fn check(&self) -> Result<(), String> {
        check_probability(self.fraud_probability)
    }
}

/// `GET /features`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub name: String,
    pub importance: f64,
}

// ============================================================================
// REQUEST PAYLOADS
// ============================================================================

/// Name of the one form field that is sent verbatim as text
pub const TYPE_FIELD: &str = "type";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PayloadError {
    #[error("field '{field}' is not a number: '{value}'")]
    NotANumber { field: String, value: String },
}

/// Transaction form serialized for `/predict`.
///
/// Every field is numeric except `type`. Blank numeric fields are left out so
/// the backend applies its own defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TransactionPayload {
    fields: BTreeMap<String, FieldValue>,
}

impl TransactionPayload {
    pub fn from_form<K, V>(fields: &[(K, V)]) -> Result<Self, PayloadError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut payload = Self::default();

        for (key, value) in fields {
            let key = key.as_ref();
            let value = value.as_ref();

            if key == TYPE_FIELD {
                payload.fields.insert(key.to_string(), FieldValue::Text(value.to_string()));
                continue;
            }

            let trimmed = value.trim();
            if trimmed.is_empty() {
                continue;
            }

            match trimmed.parse::<f64>() {
                Ok(n) if n.is_finite() => {
                    payload.fields.insert(key.to_string(), FieldValue::Number(n));
                }
                _ => {
                    return Err(PayloadError::NotANumber {
                        field: key.to_string(),
                        value: value.to_string(),
                    })
                }
            }
        }

        Ok(payload)
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A file picked by the operator for batch or ticket scoring
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Load a file from disk, keeping only its file name
    pub async fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self { name, bytes })
    }
}
