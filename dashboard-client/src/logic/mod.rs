//! Logic Module - Client state & orchestration
//!
//! ## Layout
//! - `transport/` - Backend calls (one-shot + SSE stream)
//! - `window` - Bounded Metrics Window
//! - `chart` - Live Chart Sync
//! - `dashboard` - Owner of window + charts, single event pump
//! - `flows/` - Prediction, Batch and Ticket flows
//! - `ui/` - Region state rendered by the frontend

pub mod chart;
pub mod dashboard;
pub mod flows;
pub mod transport;
pub mod types;
pub mod ui;
pub mod window;
