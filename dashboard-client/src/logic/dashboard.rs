//! Dashboard - Owner of the shared live state
//!
//! Dashboard sở hữu Metrics Window + hai chart. Mọi thay đổi đi qua một channel
//! duy nhất và được áp dụng tuần tự bởi `DashboardPump`.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::chart::{LiveChartSync, SampleDisposition};
use super::transport::FraudBackend;
use super::types::{CurrentMetrics, MetricSample, MetricsSnapshot};
use super::window::{MetricsWindow, WindowStatus};

// ============================================================================
// EVENTS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    /// Initial `/metrics` snapshot
    Snapshot(MetricsSnapshot),
    /// Sample pushed by the server stream
    Stream(MetricSample),
    /// `new_point` of a completed local prediction
    Prediction(MetricSample),
}

// ============================================================================
// STATE
// ============================================================================

pub struct DashboardState {
    window: MetricsWindow,
    charts: LiveChartSync,
    current: Option<CurrentMetrics>,
    applied: u64,
}

impl DashboardState {
    pub fn new(window: MetricsWindow, charts: LiveChartSync) -> Self {
        Self {
            window,
            charts,
            current: None,
            applied: 0,
        }
    }

    pub fn apply(&mut self, event: DashboardEvent) {
        match event {
            DashboardEvent::Snapshot(snapshot) => self.initialize(snapshot),
            DashboardEvent::Stream(sample) | DashboardEvent::Prediction(sample) => self.apply_sample(sample),
        }
    }

    /// Seed window and charts from the snapshot, then mirror any replayed
    /// early samples into the window.
    pub fn initialize(&mut self, snapshot: MetricsSnapshot) {
        if self.charts.is_initialized() {
            log::warn!("Dashboard already initialized, snapshot ignored");
            return;
        }

        self.window.snapshot_replace(&snapshot.history);
        self.current = Some(snapshot.current);

        for sample in self.charts.initialize(&snapshot.history) {
            self.window.append(sample);
            self.applied += 1;
        }
    }

    pub fn apply_sample(&mut self, sample: MetricSample) {
        match self.charts.on_sample(&sample) {
            SampleDisposition::Applied => {
                self.window.append(sample);
                self.applied += 1;
            }
            SampleDisposition::Deferred => {
                log::debug!("Sample {} held until dashboard initialization", sample.timestamp());
            }
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.charts.is_initialized()
    }

    pub fn window(&self) -> &MetricsWindow {
        &self.window
    }

    pub fn charts(&self) -> &LiveChartSync {
        &self.charts
    }

    pub fn current(&self) -> Option<&CurrentMetrics> {
        self.current.as_ref()
    }

    /// Samples applied since start (history excluded)
    pub fn applied(&self) -> u64 {
        self.applied
    }

    pub fn status(&self) -> DashboardStatus {
        DashboardStatus {
            initialized: self.charts.is_initialized(),
            window: self.window.status(),
            chart_points: self.charts.rate().len(),
            deferred: self.charts.deferred_len(),
            applied: self.applied,
            fraud_rate_text: self.current.as_ref().map(CurrentMetrics::fraud_rate_text),
            txn_per_hour_text: self.current.as_ref().map(CurrentMetrics::txn_per_hour_text),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStatus {
    pub initialized: bool,
    pub window: WindowStatus,
    pub chart_points: usize,
    pub deferred: usize,
    pub applied: u64,
    pub fraud_rate_text: Option<String>,
    pub txn_per_hour_text: Option<String>,
}

// ============================================================================
// BROADCAST
// ============================================================================

/// Application-wide notification channel for completed predictions
#[derive(Clone)]
pub struct PredictionBus {
    tx: UnboundedSender<DashboardEvent>,
}

impl PredictionBus {
    pub fn new(tx: UnboundedSender<DashboardEvent>) -> Self {
        Self { tx }
    }

    pub fn broadcast(&self, point: MetricSample) {
        if self.tx.send(DashboardEvent::Prediction(point)).is_err() {
            log::warn!("Dashboard closed, prediction point dropped");
        }
    }
}

// ============================================================================
// DASHBOARD
// ============================================================================

/// Handle to the dashboard, created once per session
#[derive(Clone)]
pub struct Dashboard {
    state: Arc<Mutex<DashboardState>>,
    tx: UnboundedSender<DashboardEvent>,
}

/// Single consumer of dashboard events
pub struct DashboardPump {
    state: Arc<Mutex<DashboardState>>,
    rx: UnboundedReceiver<DashboardEvent>,
}

impl Dashboard {
    pub fn new(state: DashboardState) -> (Self, DashboardPump) {
        let state = Arc::new(Mutex::new(state));
        let (tx, rx) = mpsc::unbounded_channel();

        (
            Self { state: state.clone(), tx },
            DashboardPump { state, rx },
        )
    }

    pub fn bus(&self) -> PredictionBus {
        PredictionBus::new(self.tx.clone())
    }

    pub fn sender(&self) -> UnboundedSender<DashboardEvent> {
        self.tx.clone()
    }

    /// Short read access; never hold across an await
    pub fn with_state<R>(&self, f: impl FnOnce(&DashboardState) -> R) -> R {
        let guard = self.state.lock();
        f(&*guard)
    }

    pub fn status(&self) -> DashboardStatus {
        self.with_state(DashboardState::status)
    }

    /// Fetch `/metrics` and queue it ahead of any stream sample.
    /// On failure the dashboard starts from an empty history.
    ///
    /// Returns the log position the snapshot covers, if the server reported one.
    pub async fn load_snapshot(&self, backend: &dyn FraudBackend) -> Option<i64> {
        let snapshot = match backend.metrics().await {
            Ok(snapshot) => {
                log::info!(
                    "Metrics snapshot loaded: {} history points, last id {:?}",
                    snapshot.history.len(),
                    snapshot.last_id
                );
                snapshot
            }
            Err(e) => {
                log::warn!("Failed to load metrics snapshot: {} - starting empty", e);
                MetricsSnapshot::empty()
            }
        };

        let last_id = snapshot.last_id;
        if self.tx.send(DashboardEvent::Snapshot(snapshot)).is_err() {
            log::warn!("Dashboard closed before snapshot was applied");
        }
        last_id
    }
}

impl DashboardPump {
    /// Apply events in arrival order until every sender is gone
    pub async fn run(mut self) {
        while let Some(event) = self.rx.recv().await {
            self.state.lock().apply(event);
        }
        log::info!("Dashboard pump stopped");
    }

    /// Apply everything already queued without waiting
    pub fn drain(&mut self) -> usize {
        let mut n = 0;
        while let Ok(event) = self.rx.try_recv() {
            self.state.lock().apply(event);
            n += 1;
        }
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::transport::fake::ScriptedBackend;
    use crate::logic::transport::TransportError;
    use crate::logic::ui::surface::MemorySurface;
    use crate::logic::types::CurrentMetrics;

    fn state(cap: usize) -> DashboardState {
        let charts = LiveChartSync::new(Box::new(MemorySurface::new()), Box::new(MemorySurface::new()));
        DashboardState::new(MetricsWindow::new(cap), charts)
    }

    fn snapshot(history: Vec<MetricSample>) -> MetricsSnapshot {
        MetricsSnapshot {
            current: CurrentMetrics {
                fraud_rate: 0.125,
                txn_per_hour: 42.0,
            },
            history,
            last_id: Some(12),
        }
    }

    fn assert_consistent(s: &DashboardState) {
        let rate = s.charts().rate();
        let prob = s.charts().probability();
        assert_eq!(rate.labels(), prob.labels());
        for (r, p) in rate.values().iter().zip(prob.values()) {
            assert!((r - 100.0 * p).abs() < 1e-9);
        }
    }

    #[test]
    fn test_labels_mirror_window_until_eviction() {
        let mut s = state(100);
        s.initialize(snapshot(vec![MetricSample::new("h1", 0.1)]));
        for i in 0..5 {
            s.apply(DashboardEvent::Stream(MetricSample::new(format!("T{}", i), 0.2)));
        }

        let labels: Vec<&str> = s.charts().rate().labels().iter().map(String::as_str).collect();
        assert_eq!(labels, s.window().timestamps());
        assert_consistent(&s);
    }

    #[test]
    fn test_stream_of_101_samples() {
        let mut s = state(100);
        s.initialize(snapshot(Vec::new()));

        for i in 0..101 {
            s.apply(DashboardEvent::Stream(MetricSample::new(format!("T{}", i), 0.5)));
        }

        // Window is bounded, charts are append-only and keep every point
        assert_eq!(s.window().len(), 100);
        assert_eq!(s.window().iter().next().unwrap().timestamp(), "T1");
        assert_eq!(s.charts().rate().len(), 101);
        assert_eq!(s.charts().probability().len(), 101);
        assert_eq!(s.charts().rate().labels()[0], "T0");
        assert_consistent(&s);
    }

    #[test]
    fn test_prediction_feeds_same_sink_as_stream() {
        let mut s = state(100);
        s.initialize(snapshot(Vec::new()));

        s.apply(DashboardEvent::Prediction(MetricSample::new("T1", 0.87)));

        assert_eq!(s.window().to_vec(), vec![MetricSample::new("T1", 0.87)]);
        assert!((s.charts().rate().values()[0] - 87.0).abs() < 1e-9);
        assert_eq!(s.charts().probability().values(), &[0.87]);
        assert_eq!(s.charts().rate().labels(), &["T1".to_string()]);
    }

    #[test]
    fn test_sample_before_snapshot_is_not_lost() {
        let mut s = state(100);
        s.apply(DashboardEvent::Stream(MetricSample::new("early", 0.4)));
        assert!(s.window().is_empty());
        assert!(!s.is_initialized());

        s.apply(DashboardEvent::Snapshot(snapshot(vec![MetricSample::new("h1", 0.1)])));

        assert_eq!(s.window().timestamps(), vec!["h1", "early"]);
        assert_eq!(s.charts().rate().len(), 2);
        assert_eq!(s.applied(), 1);
        assert_consistent(&s);
    }

    #[test]
    fn test_status_text() {
        let mut s = state(10);
        s.initialize(snapshot(Vec::new()));
        let status = s.status();
        assert!(status.initialized);
        assert_eq!(status.fraud_rate_text.as_deref(), Some("Fraud rate: 12.50%"));
        assert_eq!(status.txn_per_hour_text.as_deref(), Some("Txns/hour: 42.0"));
    }

    #[tokio::test]
    async fn test_snapshot_queued_before_stream_samples() {
        let backend = ScriptedBackend::new();
        backend.push_metrics(Ok(snapshot(vec![MetricSample::new("h1", 0.3)])));

        let (dashboard, mut pump) = Dashboard::new(state(100));
        assert_eq!(dashboard.load_snapshot(&backend).await, Some(12));
        dashboard.sender().send(DashboardEvent::Stream(MetricSample::new("T1", 0.6))).unwrap();
        dashboard.bus().broadcast(MetricSample::new("T2", 0.7));

        assert_eq!(pump.drain(), 3);
        dashboard.with_state(|s| {
            assert_eq!(s.window().timestamps(), vec!["h1", "T1", "T2"]);
            assert_consistent(s);
        });
    }

    #[tokio::test]
    async fn test_failed_snapshot_starts_empty() {
        let backend = ScriptedBackend::new();
        backend.push_metrics(Err(TransportError::Status { status: 500, body: String::new() }));

        let (dashboard, mut pump) = Dashboard::new(state(100));
        assert_eq!(dashboard.load_snapshot(&backend).await, None);
        pump.drain();

        let status = dashboard.status();
        assert!(status.initialized);
        assert_eq!(status.window.current_size, 0);
    }

    #[tokio::test]
    async fn test_pump_stops_when_senders_dropped() {
        let (dashboard, pump) = Dashboard::new(state(100));
        let handle = tokio::spawn(pump.run());

        dashboard.sender().send(DashboardEvent::Snapshot(snapshot(Vec::new()))).unwrap();
        let observer = dashboard.state.clone();
        drop(dashboard);

        handle.await.unwrap();
        assert!(observer.lock().is_initialized());
    }
}
