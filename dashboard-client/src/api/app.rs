//! App - Wiring of backend, dashboard and flows

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::logic::chart::{ChartSurface, LiveChartSync};
use crate::logic::dashboard::{Dashboard, DashboardPump, DashboardState};
use crate::logic::flows::{BatchFlow, PredictionFlow, TicketFlow};
use crate::logic::transport::{
    BackendConfig, FraudBackend, HttpBackend, ReconnectPolicy, StreamStats, StreamSubscription, TransportError,
};
use crate::logic::ui::{Alerts, LogSurface};
use crate::logic::window::MetricsWindow;

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub backend: BackendConfig,
    pub reconnect: ReconnectPolicy,
    pub window_cap: usize,
}

impl ClientConfig {
    /// Read `FRAUDWATCH_*` variables, falling back to the defaults in `constants`
    pub fn from_env() -> Self {
        use crate::constants;

        Self {
            backend: BackendConfig::default(),
            reconnect: ReconnectPolicy::default(),
            window_cap: constants::get_window_cap(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// One dashboard session: created once on load, never re-created
pub struct App {
    backend: Arc<dyn FraudBackend>,
    dashboard: Dashboard,
    prediction: PredictionFlow,
    batch: BatchFlow,
    tickets: TicketFlow,
    alerts: Alerts,
    reconnect: ReconnectPolicy,
}

impl App {
    /// HTTP backend with logging chart surfaces
    pub fn new(config: ClientConfig) -> Result<(Self, DashboardPump), TransportError> {
        let backend = Arc::new(HttpBackend::new(config.backend.clone())?);
        Ok(Self::with_backend(
            backend,
            &config,
            Box::new(LogSurface),
            Box::new(LogSurface),
        ))
    }

    pub fn with_backend(
        backend: Arc<dyn FraudBackend>,
        config: &ClientConfig,
        rate_surface: Box<dyn ChartSurface>,
        probability_surface: Box<dyn ChartSurface>,
    ) -> (Self, DashboardPump) {
        let charts = LiveChartSync::new(rate_surface, probability_surface);
        let state = DashboardState::new(MetricsWindow::new(config.window_cap), charts);
        let (dashboard, pump) = Dashboard::new(state);

        let alerts = Alerts::new();
        let app = Self {
            prediction: PredictionFlow::new(backend.clone(), dashboard.bus()),
            batch: BatchFlow::new(backend.clone(), alerts.clone()),
            tickets: TicketFlow::new(backend.clone(), alerts.clone()),
            backend,
            dashboard,
            alerts,
            reconnect: config.reconnect.clone(),
        };

        (app, pump)
    }

    /// Queue the metrics snapshot, then open the stream.
    ///
    /// The snapshot event is sent before the subscription exists, so no stream
    /// sample can overtake it in the dashboard channel.
    ///
    /// The stream resumes after the snapshot's last id, so predictions recorded
    /// between the two requests are neither lost nor counted twice.
    pub async fn start(&self) -> JoinHandle<StreamStats> {
        let last_id = self.dashboard.load_snapshot(self.backend.as_ref()).await;

        StreamSubscription::new(self.backend.clone(), self.reconnect.clone(), self.dashboard.sender())
            .resume_after(last_id)
            .spawn()
    }

    pub fn backend(&self) -> &dyn FraudBackend {
        self.backend.as_ref()
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn prediction(&self) -> &PredictionFlow {
        &self.prediction
    }

    pub fn batch(&self) -> &BatchFlow {
        &self.batch
    }

    pub fn tickets(&self) -> &TicketFlow {
        &self.tickets
    }

    pub fn alerts(&self) -> &Alerts {
        &self.alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::transport::fake::ScriptedBackend;
    use crate::logic::types::{CurrentMetrics, MetricsSnapshot};
    use crate::logic::ui::MemorySurface;

    fn app(backend: Arc<ScriptedBackend>) -> (App, DashboardPump) {
        let config = ClientConfig {
            reconnect: ReconnectPolicy::never(),
            ..ClientConfig::from_env()
        };
        App::with_backend(
            backend,
            &config,
            Box::new(MemorySurface::new()),
            Box::new(MemorySurface::new()),
        )
    }

    #[test]
    fn test_config_defaults_follow_constants() {
        use crate::constants;

        let config = ClientConfig::default();
        assert_eq!(config.backend.base_url, constants::get_backend_url());
        assert_eq!(config.window_cap, constants::get_window_cap());
        assert_eq!(config.reconnect.enabled, constants::is_reconnect_enabled());
    }

    #[tokio::test]
    async fn test_stream_opens_after_snapshot_position() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_metrics(Ok(MetricsSnapshot {
            current: CurrentMetrics {
                fraud_rate: 0.0,
                txn_per_hour: 0.0,
            },
            history: Vec::new(),
            last_id: Some(7),
        }));
        backend.push_stream(Ok(vec![]));

        let (app, _pump) = app(backend.clone());
        let stats = app.start().await.await.unwrap();

        assert_eq!(stats.connections, 1);
        assert_eq!(backend.stream_cursors(), vec![Some("7".to_string())]);
    }

    #[tokio::test]
    async fn test_stream_without_snapshot_position() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_stream(Ok(vec![]));

        let (app, _pump) = app(backend.clone());
        let _ = app.start().await.await;

        assert_eq!(backend.stream_cursors(), vec![None]);
    }
}
