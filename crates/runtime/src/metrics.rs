use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use oe_processor::{Applied, ProcessError};
use serde::Serialize;

#[derive(Clone, Default)]
pub struct ProcessingMetrics {
    inner: Arc<MetricsInner>,
}

#[derive(Default)]
struct MetricsInner {
    events_read: AtomicU64,
    lines_skipped: AtomicU64,
    orders_created: AtomicU64,
    orders_replaced: AtomicU64,
    transitions: AtomicU64,
    transitions_unchanged: AtomicU64,
    orders_not_found: AtomicU64,
}

impl ProcessingMetrics {
    pub fn inc_events_read(&self, delta: u64) {
        self.inner.events_read.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn inc_lines_skipped(&self, delta: u64) {
        self.inner.lines_skipped.fetch_add(delta, Ordering::Relaxed);
    }

    /// Counts one processor outcome.
    pub fn record(&self, outcome: &Result<Applied, ProcessError>) {
        let counter = match outcome {
            Ok(Applied::Created { replaced: false, .. }) => &self.inner.orders_created,
            Ok(Applied::Created { replaced: true, .. }) => {
                self.inner.orders_created.fetch_add(1, Ordering::Relaxed);
                &self.inner.orders_replaced
            }
            Ok(Applied::Transitioned {
                previous, current, ..
            }) => {
                if previous == current {
                    self.inner
                        .transitions_unchanged
                        .fetch_add(1, Ordering::Relaxed);
                }
                &self.inner.transitions
            }
            Err(ProcessError::OrderNotFound { .. }) => &self.inner.orders_not_found,
            // not produced by dispatch; nothing to count
            Err(ProcessError::Core(_)) => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_read: self.inner.events_read.load(Ordering::Relaxed),
            lines_skipped: self.inner.lines_skipped.load(Ordering::Relaxed),
            orders_created: self.inner.orders_created.load(Ordering::Relaxed),
            orders_replaced: self.inner.orders_replaced.load(Ordering::Relaxed),
            transitions: self.inner.transitions.load(Ordering::Relaxed),
            transitions_unchanged: self.inner.transitions_unchanged.load(Ordering::Relaxed),
            orders_not_found: self.inner.orders_not_found.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub events_read: u64,
    pub lines_skipped: u64,
    pub orders_created: u64,
    pub orders_replaced: u64,
    pub transitions: u64,
    pub transitions_unchanged: u64,
    pub orders_not_found: u64,
}

impl MetricsSnapshot {
    pub fn to_json_line(&self, label: &str, elapsed: Option<Duration>) -> String {
        #[derive(Serialize)]
        struct Snapshot<'a> {
            label: &'a str,
            #[serde(flatten)]
            counters: &'a MetricsSnapshot,
            elapsed_ms: Option<u128>,
        }

        let payload = Snapshot {
            label,
            counters: self,
            elapsed_ms: elapsed.map(|d| d.as_millis()),
        };
        serde_json::to_string(&payload).unwrap_or_else(|_| String::from("{}"))
    }
}

pub struct ReplayTimer {
    start: Instant,
}

impl ReplayTimer {
    pub fn start() -> Self {
        Self { start: Instant::now() }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
