//! Verdict formatting shared by the prediction and ticket flows

use serde::Serialize;

/// Where the verdict is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictStyle {
    /// Result region of the transaction form
    Alert,
    /// Bot entry of the ticket transcript
    Chat,
}

/// Probability as a percentage with one decimal, e.g. `87.0%`
pub fn percent(p: f64) -> String {
    format!("{:.1}%", p * 100.0)
}

/// Fraud alert or clean confidence; never both
pub fn verdict_text(is_fraud: bool, fraud_probability: f64, style: VerdictStyle) -> String {
    match (style, is_fraud) {
        (VerdictStyle::Alert, true) => format!("Fraud alert: {}", percent(fraud_probability)),
        (VerdictStyle::Alert, false) => {
            format!("Clean transaction: {} confidence", percent(1.0 - fraud_probability))
        }
        (VerdictStyle::Chat, true) => format!("Fraud detected! {}", percent(fraud_probability)),
        (VerdictStyle::Chat, false) => format!("Clean ({} confidence)", percent(1.0 - fraud_probability)),
    }
}

/// Two-slice proportion visual
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProportionSlices {
    pub labels: [&'static str; 2],
    pub clean: f64,
    pub fraud: f64,
}

impl ProportionSlices {
    pub fn new(fraud_probability: f64) -> Self {
        Self {
            labels: ["Not fraud", "Fraud"],
            clean: 1.0 - fraud_probability,
            fraud: fraud_probability,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerdictView {
    pub is_fraud: bool,
    pub fraud_probability: f64,
    pub text: String,
    pub slices: ProportionSlices,
}

impl VerdictView {
    pub fn new(is_fraud: bool, fraud_probability: f64) -> Self {
        Self {
            is_fraud,
            fraud_probability,
            text: verdict_text(is_fraud, fraud_probability, VerdictStyle::Alert),
            slices: ProportionSlices::new(fraud_probability),
        }
    }
}
