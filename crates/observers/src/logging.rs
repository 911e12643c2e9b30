use std::fmt::Write as _;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use oe_core::{Event, Order, OrderStatus};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::OrderObserver;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggerConfig {
    /// chrono `strftime` pattern for record timestamps.
    pub timestamp_format: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            timestamp_format: "%Y-%m-%d %H:%M:%S".to_string(),
        }
    }
}

/// Writes one `[LOGGER]` line per transition and per processed event.
///
/// Each record is also emitted as a structured `tracing` event.
pub struct LoggingObserver<W = io::Stdout> {
    cfg: LoggerConfig,
    out: Mutex<W>,
}

impl LoggingObserver<io::Stdout> {
    pub fn stdout(cfg: LoggerConfig) -> Self {
        Self::new(cfg, io::stdout())
    }
}

impl<W: Write + Send> LoggingObserver<W> {
    pub fn new(cfg: LoggerConfig, out: W) -> Self {
        Self {
            cfg,
            out: Mutex::new(out),
        }
    }

    pub fn into_writer(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn format_ts(&self, event: Option<&Event>) -> String {
        let Some(event) = event else {
            return String::from("N/A");
        };
        let mut out = String::new();
        // chrono reports a bad pattern as a fmt error, not at construction
        if write!(out, "{}", event.timestamp().format(&self.cfg.timestamp_format)).is_err() {
            return event.timestamp().to_rfc3339();
        }
        out
    }

    fn write_line(&self, line: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = writeln!(out, "{line}") {
            warn!(%err, "logging observer could not write record");
        }
    }
}

impl<W: Write + Send> OrderObserver for LoggingObserver<W> {
    fn on_order_status_changed(&self, order: &Order, previous: OrderStatus, new: OrderStatus) {
        let at = self.format_ts(order.latest_event());
        info!(order_id = %order.order_id(), %previous, %new, %at, "order status changed");
        self.write_line(&format!(
            "[LOGGER] Order {} status changed from {previous} to {new} at {at}",
            order.order_id()
        ));
    }

    fn on_event_processed(&self, event: &Event, order: Option<&Order>) {
        let order_id = order.map_or("N/A", |o| o.order_id().as_str());
        let at = self.format_ts(Some(event));
        info!(
            event_type = %event.event_type(),
            event_id = %event.event_id(),
            %order_id,
            %at,
            "event processed"
        );
        self.write_line(&format!(
            "[LOGGER] Event processed - Type: {}, EventId: {}, OrderId: {order_id} at {at}",
            event.event_type(),
            event.event_id(),
        ));
    }
}
