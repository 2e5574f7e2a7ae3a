//! Transaction extraction from uploaded files
//!
//! - Ticket: free text containing `field: value` pairs
//! - Batch: CSV with a header row of feature names

use regex::Regex;

use crate::error::{AppError, AppResult};
use crate::scorer::{Transaction, NUMERIC_FEATURES};

pub struct TicketParser {
    numeric: Vec<(&'static str, Regex)>,
    kind: Regex,
}

impl TicketParser {
    pub fn new() -> Result<Self, regex::Error> {
        let numeric = NUMERIC_FEATURES
            .iter()
            .map(|name| {
                let pattern = format!(r"(?i)\b{}\s*:?\s*(\d+[.,]?\d*)", regex::escape(name));
                Regex::new(&pattern).map(|re| (*name, re))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            numeric,
            kind: Regex::new(r"(?i)\btype\s*:?\s*(\w+)")?,
        })
    }

    /// Fields not found in the text stay 0 / ""
    pub fn parse(&self, text: &str) -> Transaction {
        let mut fields: Vec<(&str, &str)> = Vec::new();

        for (name, re) in &self.numeric {
            if let Some(m) = re.captures(text).and_then(|c| c.get(1)) {
                fields.push((*name, m.as_str()));
            }
        }
        if let Some(m) = self.kind.captures(text).and_then(|c| c.get(1)) {
            fields.push(("type", m.as_str()));
        }

        Transaction::from_fields(fields)
    }

    pub fn parse_upload(&self, bytes: &[u8]) -> AppResult<Transaction> {
        let text = String::from_utf8_lossy(bytes);
        if text.trim().is_empty() {
            return Err(AppError::ValidationError("empty ticket".to_string()));
        }
        Ok(self.parse(&text))
    }
}

pub fn is_csv(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// One transaction per non-blank data row
pub fn parse_batch(file_name: &str, bytes: &[u8]) -> AppResult<Vec<Transaction>> {
    if !is_csv(file_name) {
        return Err(AppError::UnsupportedFormat(format!(
            "unsupported batch format: {}",
            file_name
        )));
    }

    let text = String::from_utf8_lossy(bytes);
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());

    let header: Vec<&str> = match lines.next() {
        Some(line) => line.split(',').map(str::trim).collect(),
        None => return Err(AppError::ValidationError("empty batch file".to_string())),
    };

    let rows = lines
        .map(|line| Transaction::from_fields(header.iter().copied().zip(line.split(','))))
        .collect();

    Ok(rows)
}
