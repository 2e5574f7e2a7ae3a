//! Chart Surfaces
//!
//! Các surface dùng để vẽ chart: bộ nhớ (test/status), log (console), null.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::logic::chart::{ChartKind, ChartState, ChartSurface};

/// Keeps the last drawn frame and a redraw counter.
///
/// Clones share the same frame, so a handle kept outside the dashboard can
/// observe what was drawn.
#[derive(Clone, Default)]
pub struct MemorySurface {
    inner: Arc<Mutex<MemoryFrame>>,
}

#[derive(Default)]
struct MemoryFrame {
    redraws: u64,
    last: Option<ChartState>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn redraws(&self) -> u64 {
        self.inner.lock().redraws
    }

    pub fn last_frame(&self) -> Option<ChartState> {
        self.inner.lock().last.clone()
    }
}

impl ChartSurface for MemorySurface {
    fn redraw(&mut self, _kind: ChartKind, state: &ChartState) {
        let mut frame = self.inner.lock();
        frame.redraws += 1;
        frame.last = Some(state.clone());
    }
}

/// Logs the newest point of each redraw at debug level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSurface;

impl ChartSurface for LogSurface {
    fn redraw(&mut self, kind: ChartKind, state: &ChartState) {
        match (state.labels().last(), state.values().last()) {
            (Some(label), Some(value)) => {
                log::debug!("[{}] {} points, last {} = {:.3}", kind.label(), state.len(), label, value)
            }
            _ => log::debug!("[{}] empty", kind.label()),
        }
    }
}
