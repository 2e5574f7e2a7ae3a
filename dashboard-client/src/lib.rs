//! FraudWatch Client - Live fraud dashboard & submission core
//!
//! Real-time state sync (Metrics Window + Live Chart Sync fed by the server
//! stream) and the independent request flows of the operator console.
//!
//! ```text
//!  /stream ──► StreamSubscription ─┐
//!                                  ├─► DashboardPump ─► MetricsWindow
//!  PredictionFlow ─► PredictionBus ┘                  └► LiveChartSync ─► ChartSurface x2
//!  BatchFlow  ─► BatchRegion
//!  TicketFlow ─► Transcript
//! ```

pub mod api;
pub mod constants;
pub mod logic;

pub use api::app::{App, ClientConfig};
pub use logic::dashboard::{Dashboard, DashboardEvent, DashboardPump, DashboardState};
pub use logic::transport::{BackendConfig, FraudBackend, HttpBackend, ReconnectPolicy, StreamCursor, TransportError};
pub use logic::types::{MetricSample, SelectedFile};
