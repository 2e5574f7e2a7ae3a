//! FraudWatch Scoring Server
//!
//! Development backend for the dashboard client.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 FRAUDWATCH SCORING SERVER                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  /predict ─┐                          ┌─► /metrics          │
//! │  /batch   ─┼─► Scorer ─► PredictionLog┤                     │
//! │  /upload_ticket ─► TicketParser       └─► /stream (SSE)     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only `/predict` writes the log; batch rows and tickets are scored but not
//! recorded.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod scorer;
pub mod store;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use config::Config;
pub use error::{AppError, AppResult};

/// Upload cap for `/batch` and `/upload_ticket`
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub log: store::PredictionLog,
    pub scorer: Arc<scorer::Scorer>,
    pub tickets: Arc<extract::TicketParser>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, regex::Error> {
        Ok(Self {
            scorer: Arc::new(scorer::Scorer::new(config.fraud_threshold)),
            tickets: Arc::new(extract::TicketParser::new()?),
            log: store::PredictionLog::new(),
            config,
        })
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/predict", post(handlers::predict::predict))
        .route("/metrics", get(handlers::metrics::get))
        .route("/stream", get(handlers::stream::subscribe))
        .route("/batch", post(handlers::batch::score))
        .route("/upload_ticket", post(handlers::ticket::upload))
        .route("/features", get(handlers::features::list))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Serve on an already bound listener until the task is dropped
pub async fn serve(listener: tokio::net::TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, create_router(state)).await
}
