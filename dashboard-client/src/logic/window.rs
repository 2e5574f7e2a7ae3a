//! Metrics Window - Bounded sample history
//!
//! Quản lý buffer chứa các sample gần nhất (FIFO, có giới hạn).

use std::collections::VecDeque;

use serde::Serialize;

use super::types::MetricSample;
use crate::constants::DEFAULT_WINDOW_CAP;

// ============================================================================
// WINDOW
// ============================================================================

/// Recent fraud-probability samples in arrival order.
///
/// `len() <= capacity()` always holds; appending past capacity evicts from the head.
#[derive(Debug, Clone)]
pub struct MetricsWindow {
    samples: VecDeque<MetricSample>,
    cap: usize,
}

impl Default for MetricsWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_CAP)
    }
}

impl MetricsWindow {
    /// Capacity is clamped to at least one sample
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            samples: VecDeque::with_capacity(cap),
            cap,
        }
    }

    /// Insert at the tail, evicting the oldest samples beyond capacity
    pub fn append(&mut self, sample: MetricSample) {
        self.samples.push_back(sample);

        while self.samples.len() > self.cap {
            self.samples.pop_front();
        }
    }

    /// Replace the whole window with a server-provided history.
    /// Only the most recent `cap` items are kept.
    pub fn snapshot_replace(&mut self, history: &[MetricSample]) {
        let start = history.len().saturating_sub(self.cap);
        self.samples.clear();
        self.samples.extend(history[start..].iter().cloned());
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricSample> {
        self.samples.iter()
    }

    pub fn latest(&self) -> Option<&MetricSample> {
        self.samples.back()
    }

    pub fn timestamps(&self) -> Vec<&str> {
        self.samples.iter().map(MetricSample::timestamp).collect()
    }

    pub fn to_vec(&self) -> Vec<MetricSample> {
        self.samples.iter().cloned().collect()
    }

    pub fn status(&self) -> WindowStatus {
        WindowStatus {
            current_size: self.samples.len(),
            capacity: self.cap,
            fill_percent: (self.samples.len() as f32 / self.cap as f32 * 100.0).min(100.0),
        }
    }
}

/// Window status information
#[derive(Debug, Clone, Serialize)]
pub struct WindowStatus {
    pub current_size: usize,
    pub capacity: usize,
    pub fill_percent: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(i: usize) -> MetricSample {
        MetricSample::new(format!("T{}", i), (i % 10) as f64 / 10.0)
    }

    #[test]
    fn test_append_stays_bounded() {
        let mut window = MetricsWindow::new(5);

        for i in 0..12 {
            window.append(sample(i));
            assert!(window.len() <= 5);
            assert_eq!(window.len(), (i + 1).min(5));
        }

        assert_eq!(window.timestamps(), vec!["T7", "T8", "T9", "T10", "T11"]);
    }

    #[test]
    fn test_default_cap_evicts_oldest() {
        let mut window = MetricsWindow::default();
        for i in 0..101 {
            window.append(sample(i));
        }

        assert_eq!(window.len(), 100);
        assert_eq!(window.iter().next().unwrap().timestamp(), "T1");
        assert_eq!(window.latest().unwrap().timestamp(), "T100");
    }

    #[test]
    fn test_snapshot_replace_truncates_to_recent() {
        let mut window = MetricsWindow::new(3);
        window.append(sample(99));

        let history: Vec<_> = (0..6).map(sample).collect();
        window.snapshot_replace(&history);

        assert_eq!(window.timestamps(), vec!["T3", "T4", "T5"]);
    }

    #[test]
    fn test_snapshot_replace_smaller_history() {
        let mut window = MetricsWindow::new(10);
        window.snapshot_replace(&[sample(1), sample(2)]);
        assert_eq!(window.len(), 2);

        window.snapshot_replace(&[]);
        assert!(window.is_empty());
    }

    #[test]
    fn test_zero_cap_clamped() {
        let mut window = MetricsWindow::new(0);
        window.append(sample(1));
        window.append(sample(2));
        assert_eq!(window.capacity(), 1);
        assert_eq!(window.timestamps(), vec!["T2"]);
    }

    #[test]
    fn test_status() {
        let mut window = MetricsWindow::new(4);
        window.append(sample(1));
        let status = window.status();
        assert_eq!(status.current_size, 1);
        assert_eq!(status.capacity, 4);
        assert!((status.fill_percent - 25.0).abs() < f32::EPSILON);
    }
}
