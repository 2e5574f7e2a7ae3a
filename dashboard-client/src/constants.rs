//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! To point the client at another backend, set `FRAUDWATCH_BACKEND_URL`.

/// Default backend URL
///
/// For development: http://localhost:8000 (scoring-server default port)
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Default one-shot request timeout (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default Metrics Window capacity (samples)
pub const DEFAULT_WINDOW_CAP: usize = 100;

/// Default delay before reopening a dropped stream (milliseconds)
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 3000;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "FraudWatch";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get backend URL from environment or use default
pub fn get_backend_url() -> String {
    std::env::var("FRAUDWATCH_BACKEND_URL")
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string())
}

/// Get request timeout from environment or use default
pub fn get_timeout_secs() -> u64 {
    std::env::var("FRAUDWATCH_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_TIMEOUT_SECS)
}

/// Get window capacity from environment or use default
pub fn get_window_cap() -> usize {
    std::env::var("FRAUDWATCH_WINDOW_CAP")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|cap| *cap > 0)
        .unwrap_or(DEFAULT_WINDOW_CAP)
}

/// Check if stream reconnect is enabled
pub fn is_reconnect_enabled() -> bool {
    std::env::var("FRAUDWATCH_STREAM_RECONNECT")
        .map(|s| s.to_lowercase() != "false" && s != "0")
        .unwrap_or(true)
}

/// Get reconnect delay from environment or use default
pub fn get_reconnect_delay_ms() -> u64 {
    std::env::var("FRAUDWATCH_STREAM_RECONNECT_DELAY_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_RECONNECT_DELAY_MS)
}

/// Get max consecutive reconnect attempts (None = unlimited)
pub fn get_max_reconnects() -> Option<u32> {
    std::env::var("FRAUDWATCH_STREAM_MAX_RECONNECTS")
        .ok()
        .and_then(|s| s.parse().ok())
}
