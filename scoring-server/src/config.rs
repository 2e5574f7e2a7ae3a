//! Configuration module

use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Probability above which a transaction is flagged
    pub fraud_threshold: f64,

    /// How often `/stream` polls the prediction log (milliseconds)
    pub stream_poll_ms: u64,

    /// Lookback of `/metrics` (hours)
    pub metrics_window_hours: i64,

    /// Environment (development, production)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            fraud_threshold: 0.5,
            stream_poll_ms: 1000,
            metrics_window_hours: 24,
            environment: "development".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            fraud_threshold: env::var("FRAUD_THRESHOLD")
                .ok()
                .and_then(|t| t.parse().ok())
                .filter(|t: &f64| (0.0..=1.0).contains(t))
                .unwrap_or(defaults.fraud_threshold),

            stream_poll_ms: env::var("STREAM_POLL_MS")
                .ok()
                .and_then(|ms| ms.parse().ok())
                .unwrap_or(defaults.stream_poll_ms),

            metrics_window_hours: env::var("METRICS_WINDOW_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(defaults.metrics_window_hours),

            environment: env::var("ENVIRONMENT")
                .unwrap_or(defaults.environment),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.fraud_threshold, 0.5);
        assert!(!config.is_production());
    }

    #[test]
    fn test_production_environment() {
        let config = Config {
            environment: "production".to_string(),
            ..Config::default()
        };
        assert!(config.is_production());
    }
}
