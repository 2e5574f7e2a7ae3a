//! Heuristic fraud scorer
//!
//! Deterministic stand-in for the trained model: a logistic score over the
//! same transaction features the model consumes.

use serde_json::{Map, Value};

/// Numeric model inputs, in the order the backend documents them
pub const NUMERIC_FEATURES: [&str; 7] = [
    "amount",
    "oldbalanceOrg",
    "newbalanceOrig",
    "oldbalanceDest",
    "newbalanceDest",
    "balanceDiffOrig",
    "balanceDiffDest",
];

/// Categorical input
pub const TYPE_FEATURE: &str = "type";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transaction {
    /// Indexed like [`NUMERIC_FEATURES`]
    pub numeric: [f64; 7],
    pub kind: String,
}

impl Transaction {
    /// Missing or non-numeric features default to 0, a missing type to ""
    pub fn from_json(body: &Map<String, Value>) -> Self {
        let mut tx = Self::default();

        for (i, name) in NUMERIC_FEATURES.iter().enumerate() {
            tx.numeric[i] = match body.get(*name) {
                Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
                Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
                _ => 0.0,
            };
        }

        tx.kind = match body.get(TYPE_FEATURE) {
            Some(Value::String(s)) => s.clone(),
            _ => String::new(),
        };
        tx
    }

    pub fn from_fields<'a, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut tx = Self::default();

        for (name, value) in fields {
            let name = name.trim();
            if name == TYPE_FEATURE {
                tx.kind = value.trim().to_string();
            } else if let Some(i) = NUMERIC_FEATURES.iter().position(|f| *f == name) {
                tx.numeric[i] = value.trim().replace(',', ".").parse().unwrap_or(0.0);
            }
        }
        tx
    }

    pub fn get(&self, name: &str) -> f64 {
        NUMERIC_FEATURES
            .iter()
            .position(|f| *f == name)
            .map(|i| self.numeric[i])
            .unwrap_or(0.0)
    }
}

pub struct Scorer {
    threshold: f64,
}

impl Scorer {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Fraud probability in [0, 1]
    pub fn probability(&self, tx: &Transaction) -> f64 {
        let amount = tx.get("amount").max(0.0);
        let old_orig = tx.get("oldbalanceOrg");
        let new_orig = tx.get("newbalanceOrig");
        let old_dest = tx.get("oldbalanceDest");
        let new_dest = tx.get("newbalanceDest");

        let mut z = -3.0;

        z += match tx.kind.to_uppercase().as_str() {
            "TRANSFER" => 1.6,
            "CASH_OUT" => 1.4,
            "DEBIT" => 0.2,
            "PAYMENT" => -1.2,
            "CASH_IN" => -1.5,
            _ => 0.0,
        };

        z += 0.25 * amount.ln_1p();

        // Origin account emptied
        if old_orig > 0.0 && new_orig <= 0.0 {
            z += 2.0;
        }
        if old_orig > 0.0 && amount > old_orig {
            z += 0.8;
        }
        // Money left but never arrived
        if amount > 0.0 && (new_dest - old_dest).abs() < f64::EPSILON {
            z += 1.0;
        }

        let p = 1.0 / (1.0 + (-z).exp());
        if p.is_finite() {
            p.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn is_fraud(&self, probability: f64) -> bool {
        probability > self.threshold
    }

    /// Relative weight of each input, highest first
    pub fn importances(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("type", 0.30),
            ("newbalanceOrig", 0.22),
            ("oldbalanceOrg", 0.16),
            ("amount", 0.12),
            ("newbalanceDest", 0.08),
            ("oldbalanceDest", 0.06),
            ("balanceDiffOrig", 0.04),
            ("balanceDiffDest", 0.02),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn drained_transfer() -> Transaction {
        Transaction::from_fields([
            ("type", "TRANSFER"),
            ("amount", "9000"),
            ("oldbalanceOrg", "9000"),
            ("newbalanceOrig", "0"),
        ])
    }

    #[test]
    fn test_drained_transfer_is_flagged() {
        let scorer = Scorer::new(0.5);
        let p = scorer.probability(&drained_transfer());
        assert!(p > 0.9, "p = {}", p);
        assert!(scorer.is_fraud(p));
    }

    #[test]
    fn test_small_payment_is_clean() {
        let scorer = Scorer::new(0.5);
        let tx = Transaction::from_fields([
            ("type", "PAYMENT"),
            ("amount", "20"),
            ("oldbalanceOrg", "1000"),
            ("newbalanceOrig", "980"),
        ]);
        let p = scorer.probability(&tx);
        assert!(p < 0.2, "p = {}", p);
        assert!(!scorer.is_fraud(p));
    }

    #[test]
    fn test_from_json_defaults() {
        let body = json!({ "type": "purchase", "amount": 250.0, "oldbalanceOrg": "100" });
        let tx = Transaction::from_json(body.as_object().unwrap());
        assert_eq!(tx.kind, "purchase");
        assert_eq!(tx.get("amount"), 250.0);
        assert_eq!(tx.get("oldbalanceOrg"), 100.0);
        assert_eq!(tx.get("newbalanceDest"), 0.0);
    }

    #[test]
    fn test_probability_bounds() {
        let scorer = Scorer::new(0.5);
        let huge = Transaction::from_fields([("amount", "1e300"), ("type", "TRANSFER")]);
        let p = scorer.probability(&huge);
        assert!((0.0..=1.0).contains(&p));
        assert!((0.0..=1.0).contains(&scorer.probability(&Transaction::default())));
    }

    #[test]
    fn test_importances_sorted() {
        let imp = Scorer::new(0.5).importances();
        assert!(imp.windows(2).all(|w| w[0].1 >= w[1].1));
    }
}
