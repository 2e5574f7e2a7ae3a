//! Transport errors

/// Failure of a backend call.
///
/// `Status`, `Parse` and `Malformed` all count as transport failures for the
/// flows; only the stream treats a bad message differently (it is skipped).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Stream closed")]
    StreamClosed,
}

impl TransportError {
    /// Bad payload rather than a broken connection
    pub fn is_bad_message(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::Malformed(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TransportError::Parse(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}
