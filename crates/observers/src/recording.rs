use std::sync::{Mutex, PoisonError};

use oe_core::{Event, EventId, EventKind, Order, OrderId, OrderStatus};

use crate::OrderObserver;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    StatusChanged {
        order_id: OrderId,
        previous: OrderStatus,
        new: OrderStatus,
    },
    EventProcessed {
        event_id: EventId,
        kind: EventKind,
        order_id: Option<OrderId>,
    },
}

/// Keeps every notification it receives, in arrival order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn status_changes(&self) -> usize {
        self.count(|n| matches!(n, Notification::StatusChanged { .. }))
    }

    pub fn events_processed(&self) -> usize {
        self.count(|n| matches!(n, Notification::EventProcessed { .. }))
    }

    fn count(&self, pred: impl Fn(&Notification) -> bool) -> usize {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|n| pred(n))
            .count()
    }

    fn push(&self, notification: Notification) {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

impl OrderObserver for RecordingObserver {
    fn on_order_status_changed(&self, order: &Order, previous: OrderStatus, new: OrderStatus) {
        self.push(Notification::StatusChanged {
            order_id: order.order_id().clone(),
            previous,
            new,
        });
    }

    fn on_event_processed(&self, event: &Event, order: Option<&Order>) {
        self.push(Notification::EventProcessed {
            event_id: event.event_id().to_string(),
            kind: event.event_type(),
            order_id: order.map(|o| o.order_id().clone()),
        });
    }
}
