//! UI Regions
//!
//! Trạng thái hiển thị của từng vùng UI. Markup nằm ngoài; ở đây chỉ giữ dữ
//! liệu mà mỗi vùng phải hiển thị.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::logic::flows::verdict::VerdictView;

// ============================================================================
// PREDICTION RESULT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PredictionPhase {
    Idle,
    Submitting,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ResultView {
    Empty,
    Verdict(VerdictView),
    Error(String),
}

/// Result region of the transaction form.
///
/// Only the latest submission may render; older resolutions are ignored.
#[derive(Debug, Clone, Serialize)]
pub struct ResultRegion {
    loading: bool,
    view: ResultView,
    latest_seq: u64,
}

impl Default for ResultRegion {
    fn default() -> Self {
        Self {
            loading: false,
            view: ResultView::Empty,
            latest_seq: 0,
        }
    }
}

impl ResultRegion {
    /// Clear the previous result and show the loading indicator
    pub fn begin(&mut self, seq: u64) {
        self.latest_seq = seq;
        self.loading = true;
        self.view = ResultView::Empty;
    }

    /// Render a terminal view; false if `seq` is stale
    pub fn complete(&mut self, seq: u64, view: ResultView) -> bool {
        if seq != self.latest_seq {
            return false;
        }
        self.loading = false;
        self.view = view;
        true
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn phase(&self) -> PredictionPhase {
        if self.loading {
            PredictionPhase::Submitting
        } else {
            PredictionPhase::Idle
        }
    }

    pub fn view(&self) -> &ResultView {
        &self.view
    }

    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }
}

// ============================================================================
// BATCH RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BatchView {
    Empty,
    Count(u64),
    Error(String),
}

impl BatchView {
    pub fn text(&self) -> String {
        match self {
            BatchView::Empty => String::new(),
            BatchView::Count(n) => format!("Frauds detected: {}", n),
            BatchView::Error(msg) => msg.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchRegion {
    view: BatchView,
    latest_seq: u64,
}

impl Default for BatchRegion {
    fn default() -> Self {
        Self {
            view: BatchView::Empty,
            latest_seq: 0,
        }
    }
}

impl BatchRegion {
    pub fn begin(&mut self, seq: u64) {
        self.latest_seq = seq;
    }

    pub fn complete(&mut self, seq: u64, view: BatchView) -> bool {
        if seq != self.latest_seq {
            return false;
        }
        self.view = view;
        true
    }

    pub fn view(&self) -> &BatchView {
        &self.view
    }
}

// ============================================================================
// ALERTS
// ============================================================================

/// User-facing prompts (validation messages)
#[derive(Debug, Clone, Default)]
pub struct Alerts {
    inner: Arc<Mutex<Vec<String>>>,
}

impl Alerts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, message: impl Into<String>) {
        let message = message.into();
        log::info!("Alert: {}", message);
        self.inner.lock().push(message);
    }

    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.inner.lock())
    }

    /// Remove the first pending copy of `message`, once it has been shown
    pub fn dismiss(&self, message: &str) -> bool {
        let mut inner = self.inner.lock();
        match inner.iter().position(|m| m == message) {
            Some(i) => {
                inner.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
