//! Observer trait and the reference observers.

use oe_core::{Event, Order, OrderStatus};

mod alert;
mod logging;
mod recording;

pub use alert::{AlertConfig, AlertObserver};
pub use logging::{LoggerConfig, LoggingObserver};
pub use recording::{Notification, RecordingObserver};

/// Side-effect-only consumer of processor notifications.
///
/// Implementations must not assume `on_order_status_changed` implies an
/// actual change: it fires after every successful lookup for payment,
/// shipping and cancellation events, with `previous == new` when the event
/// left the status alone. It never fires for `OrderCreated`.
pub trait OrderObserver: Send + Sync {
    fn on_order_status_changed(&self, order: &Order, previous: OrderStatus, new: OrderStatus);

    /// Fires once per dispatched event, creation included. `order` is `None`
    /// when the event referenced an order that does not exist.
    fn on_event_processed(&self, event: &Event, order: Option<&Order>);
}
