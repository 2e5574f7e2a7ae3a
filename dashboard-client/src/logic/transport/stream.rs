//! Stream Subscription
//!
//! Long-lived subscription to `/stream`. Mỗi sample nhận được được chuyển theo
//! đúng thứ tự tới dashboard; reconnect là một lựa chọn cấu hình rõ ràng.
//!
//! Every connection resumes after the last event id consumed, so samples
//! recorded while disconnected are replayed rather than lost.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use super::{FraudBackend, StreamCursor};
use crate::logic::dashboard::DashboardEvent;

/// What to do when the stream drops
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    pub enabled: bool,
    pub delay: Duration,
    /// Consecutive failed attempts before giving up (None = unlimited)
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        use crate::constants;

        Self {
            enabled: constants::is_reconnect_enabled(),
            delay: Duration::from_millis(constants::get_reconnect_delay_ms()),
            max_attempts: constants::get_max_reconnects(),
        }
    }
}

impl ReconnectPolicy {
    /// Single connection, no retry
    pub fn never() -> Self {
        Self {
            enabled: false,
            delay: Duration::ZERO,
            max_attempts: Some(0),
        }
    }

    pub fn fixed(delay: Duration, max_attempts: Option<u32>) -> Self {
        Self {
            enabled: true,
            delay,
            max_attempts,
        }
    }

    fn allows(&self, failures: u32) -> bool {
        self.enabled && self.max_attempts.map_or(true, |max| failures < max)
    }
}

/// Counters returned when a subscription ends
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamStats {
    pub connections: u32,
    pub delivered: u64,
    pub skipped: u64,
}

pub struct StreamSubscription {
    backend: Arc<dyn FraudBackend>,
    policy: ReconnectPolicy,
    sink: UnboundedSender<DashboardEvent>,
    cursor: StreamCursor,
}

impl StreamSubscription {
    pub fn new(
        backend: Arc<dyn FraudBackend>,
        policy: ReconnectPolicy,
        sink: UnboundedSender<DashboardEvent>,
    ) -> Self {
        Self {
            backend,
            policy,
            sink,
            cursor: StreamCursor::new(),
        }
    }

    /// Start after the given log position instead of the server's current end
    pub fn resume_after(mut self, last_id: Option<i64>) -> Self {
        if let Some(id) = last_id {
            self.cursor = StreamCursor::starting_after(id);
        }
        self
    }

    pub fn spawn(self) -> JoinHandle<StreamStats> {
        tokio::spawn(self.run())
    }

    /// Consume the stream until the dashboard goes away or the policy gives up
    pub async fn run(self) -> StreamStats {
        let mut stats = StreamStats::default();
        let mut failures: u32 = 0;

        loop {
            match self.backend.open_stream(&self.cursor).await {
                Ok(mut stream) => {
                    stats.connections += 1;
                    failures = 0;

                    while let Some(item) = stream.next().await {
                        match item {
                            Ok(sample) => {
                                if self.sink.send(DashboardEvent::Stream(sample)).is_err() {
                                    log::info!("Dashboard closed, ending stream subscription");
                                    return stats;
                                }
                                stats.delivered += 1;
                            }
                            Err(e) if e.is_bad_message() => {
                                log::warn!("Skipping stream message: {}", e);
                                stats.skipped += 1;
                            }
                            Err(e) => {
                                log::warn!("Stream interrupted: {}", e);
                                break;
                            }
                        }
                    }

                    log::warn!("Stream disconnected after {} samples", stats.delivered);
                }
                Err(e) => {
                    failures += 1;
                    log::warn!("Failed to open stream (attempt {}): {}", failures, e);
                }
            }

            if !self.policy.allows(failures) {
                if self.policy.enabled {
                    log::error!("Stream reconnect gave up after {} failed attempts", failures);
                } else {
                    log::info!("Stream reconnect disabled, subscription ended");
                }
                return stats;
            }

            tokio::time::sleep(self.policy.delay).await;

            if self.sink.is_closed() {
                return stats;
            }
            log::info!("Reconnecting stream after event {:?}", self.cursor.get());
        }
    }
}
