//! Live Chart Sync
//!
//! Giữ hai chart (tỉ lệ fraud % và xác suất trung bình) đồng bộ với các sample
//! mới nhận, append tăng dần rồi vẽ lại.

use serde::Serialize;

use super::types::MetricSample;

// ============================================================================
// CHART STATE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChartKind {
    /// `fraud_probability * 100`
    Rate,
    /// raw `fraud_probability`
    Probability,
}

impl ChartKind {
    pub fn label(&self) -> &'static str {
        match self {
            ChartKind::Rate => "Fraud %",
            ChartKind::Probability => "Avg. probability",
        }
    }

    pub fn project(&self, fraud_probability: f64) -> f64 {
        match self {
            ChartKind::Rate => fraud_probability * 100.0,
            ChartKind::Probability => fraud_probability,
        }
    }
}

/// Label and value series of one line chart. Both vectors always have equal length.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartState {
    labels: Vec<String>,
    values: Vec<f64>,
}

impl ChartState {
    fn from_history(kind: ChartKind, history: &[MetricSample]) -> Self {
        Self {
            labels: history.iter().map(|s| s.timestamp().to_string()).collect(),
            values: history.iter().map(|s| kind.project(s.fraud_probability())).collect(),
        }
    }

    fn push(&mut self, label: &str, value: f64) {
        self.labels.push(label.to_string());
        self.values.push(value);
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// A visual surface that renders one chart.
pub trait ChartSurface: Send {
    fn redraw(&mut self, kind: ChartKind, state: &ChartState);
}

/// Whether a sample reached the charts or was held until initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleDisposition {
    Applied,
    Deferred,
}

// ============================================================================
// SYNC
// ============================================================================

pub struct LiveChartSync {
    rate: ChartState,
    probability: ChartState,
    rate_surface: Box<dyn ChartSurface>,
    probability_surface: Box<dyn ChartSurface>,
    initialized: bool,
    deferred: Vec<MetricSample>,
}

impl LiveChartSync {
    pub fn new(rate_surface: Box<dyn ChartSurface>, probability_surface: Box<dyn ChartSurface>) -> Self {
        Self {
            rate: ChartState::default(),
            probability: ChartState::default(),
            rate_surface,
            probability_surface,
            initialized: false,
            deferred: Vec::new(),
        }
    }

    /// Seed both charts from the history snapshot, then replay any sample that
    /// arrived early. Runs once; later calls are ignored.
    ///
    /// Returns the replayed samples so the owner can mirror them elsewhere.
    pub fn initialize(&mut self, history: &[MetricSample]) -> Vec<MetricSample> {
        if self.initialized {
            log::warn!("Live charts already initialized, ignoring second snapshot");
            return Vec::new();
        }

        self.rate = ChartState::from_history(ChartKind::Rate, history);
        self.probability = ChartState::from_history(ChartKind::Probability, history);
        self.initialized = true;
        self.redraw();

        let replay = std::mem::take(&mut self.deferred);
        if !replay.is_empty() {
            log::debug!("Replaying {} samples received before initialization", replay.len());
        }
        for sample in &replay {
            self.append(sample);
        }

        log::info!("Live charts initialized with {} history points", history.len());
        replay
    }

    pub fn on_sample(&mut self, sample: &MetricSample) -> SampleDisposition {
        if !self.initialized {
            self.deferred.push(sample.clone());
            return SampleDisposition::Deferred;
        }

        self.append(sample);
        SampleDisposition::Applied
    }

    // Both appends land before the redraw
    fn append(&mut self, sample: &MetricSample) {
        let p = sample.fraud_probability();
        self.rate.push(sample.timestamp(), ChartKind::Rate.project(p));
        self.probability.push(sample.timestamp(), ChartKind::Probability.project(p));
        self.redraw();
    }

    fn redraw(&mut self) {
        self.rate_surface.redraw(ChartKind::Rate, &self.rate);
        self.probability_surface.redraw(ChartKind::Probability, &self.probability);
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    pub fn rate(&self) -> &ChartState {
        &self.rate
    }

    pub fn probability(&self) -> &ChartState {
        &self.probability
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::ui::surface::MemorySurface;

    fn sync_with_surfaces() -> (LiveChartSync, MemorySurface, MemorySurface) {
        let rate = MemorySurface::new();
        let prob = MemorySurface::new();
        let sync = LiveChartSync::new(Box::new(rate.clone()), Box::new(prob.clone()));
        (sync, rate, prob)
    }

    fn assert_pointwise(sync: &LiveChartSync) {
        assert_eq!(sync.rate().labels(), sync.probability().labels());
        assert_eq!(sync.rate().len(), sync.probability().len());
        for (r, p) in sync.rate().values().iter().zip(sync.probability().values()) {
            assert!((r - 100.0 * p).abs() < 1e-9, "rate {} != 100 * {}", r, p);
        }
    }

    #[test]
    fn test_initialize_projects_history() {
        let (mut sync, rate, prob) = sync_with_surfaces();
        let history = vec![MetricSample::new("h1", 0.2), MetricSample::new("h2", 0.45)];

        let replayed = sync.initialize(&history);

        assert!(replayed.is_empty());
        assert_eq!(sync.rate().labels(), &["h1".to_string(), "h2".to_string()]);
        assert_eq!(sync.probability().values(), &[0.2, 0.45]);
        assert_pointwise(&sync);
        assert_eq!(rate.redraws(), 1);
        assert_eq!(prob.redraws(), 1);
    }

    #[test]
    fn test_on_sample_appends_then_redraws() {
        let (mut sync, rate, prob) = sync_with_surfaces();
        sync.initialize(&[]);

        assert_eq!(sync.on_sample(&MetricSample::new("T1", 0.87)), SampleDisposition::Applied);

        assert_eq!(sync.rate().labels(), &["T1".to_string()]);
        assert!((sync.rate().values()[0] - 87.0).abs() < 1e-9);
        assert_eq!(sync.probability().values(), &[0.87]);

        // The redraw observed the appended point on both surfaces
        assert_eq!(rate.redraws(), 2);
        assert_eq!(rate.last_frame().unwrap().len(), 1);
        assert_eq!(prob.last_frame().unwrap().values(), &[0.87]);
    }

    #[test]
    fn test_early_samples_are_replayed() {
        let (mut sync, rate, _prob) = sync_with_surfaces();

        assert_eq!(sync.on_sample(&MetricSample::new("early", 0.3)), SampleDisposition::Deferred);
        assert_eq!(sync.deferred_len(), 1);
        assert!(sync.rate().is_empty());
        assert_eq!(rate.redraws(), 0);

        let replayed = sync.initialize(&[MetricSample::new("h1", 0.1)]);

        assert_eq!(replayed, vec![MetricSample::new("early", 0.3)]);
        assert_eq!(sync.deferred_len(), 0);
        assert_eq!(sync.rate().labels(), &["h1".to_string(), "early".to_string()]);
        assert_pointwise(&sync);
    }

    #[test]
    fn test_second_initialize_ignored() {
        let (mut sync, _rate, _prob) = sync_with_surfaces();
        sync.initialize(&[MetricSample::new("h1", 0.1)]);
        sync.on_sample(&MetricSample::new("T1", 0.5));

        sync.initialize(&[MetricSample::new("other", 0.9)]);

        assert_eq!(sync.rate().labels(), &["h1".to_string(), "T1".to_string()]);
    }

    #[test]
    fn test_charts_are_unbounded() {
        let (mut sync, _rate, _prob) = sync_with_surfaces();
        sync.initialize(&[]);
        for i in 0..250 {
            sync.on_sample(&MetricSample::new(format!("T{}", i), 0.5));
        }
        assert_eq!(sync.rate().len(), 250);
        assert_pointwise(&sync);
    }
}
