use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use oe_core::{Event, EventKind, Order, OrderStatus};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::OrderObserver;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AlertConfig {
    pub critical_statuses: Vec<OrderStatus>,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            critical_statuses: vec![OrderStatus::Shipped, OrderStatus::Cancelled],
        }
    }
}

/// Raises `[ALERT]` lines for critical statuses and for cancellation events.
pub struct AlertObserver<W = io::Stdout> {
    cfg: AlertConfig,
    out: Mutex<W>,
    sent: AtomicU64,
}

impl AlertObserver<io::Stdout> {
    pub fn stdout(cfg: AlertConfig) -> Self {
        Self::new(cfg, io::stdout())
    }
}

impl<W: Write + Send> AlertObserver<W> {
    pub fn new(cfg: AlertConfig, out: W) -> Self {
        Self {
            cfg,
            out: Mutex::new(out),
            sent: AtomicU64::new(0),
        }
    }

    pub fn alerts_sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    pub fn into_writer(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_critical(&self, status: OrderStatus) -> bool {
        self.cfg.critical_statuses.contains(&status)
    }

    fn raise(&self, line: &str) {
        self.sent.fetch_add(1, Ordering::Relaxed);
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = writeln!(out, "{line}") {
            warn!(%err, "alert observer could not write alert");
        }
    }
}

impl<W: Write + Send> OrderObserver for AlertObserver<W> {
    fn on_order_status_changed(&self, order: &Order, _previous: OrderStatus, new: OrderStatus) {
        if !self.is_critical(new) {
            return;
        }
        warn!(order_id = %order.order_id(), status = %new, "critical status alert");
        self.raise(&format!(
            "[ALERT] Sending alert for Order {}: Status changed to {new}",
            order.order_id()
        ));
    }

    fn on_event_processed(&self, event: &Event, order: Option<&Order>) {
        if event.event_type() != EventKind::OrderCancelled {
            return;
        }
        let order_id = order.map_or("Unknown", |o| o.order_id().as_str());
        warn!(%order_id, event_id = %event.event_id(), "cancellation alert");
        self.raise(&format!(
            "[ALERT] Critical event: Order {order_id} has been cancelled"
        ));
    }
}
