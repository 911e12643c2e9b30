//! Event processor: the state machine mapping each event onto order state
//! and observer notifications.

use std::collections::HashMap;
use std::sync::Arc;

use oe_core::{CoreError, Event, EventId, EventKind, Order, OrderEvent, OrderId, OrderStatus};
use oe_observers::OrderObserver;
use tracing::{debug, info, warn};

mod shared;
mod transition;

pub use shared::SharedEventProcessor;
pub use transition::payment_status;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    #[error("order {order_id} not found for {kind} event {event_id}")]
    OrderNotFound {
        order_id: OrderId,
        event_id: EventId,
        kind: EventKind,
    },
    /// `Order::open` refused the event. Dispatch only opens orders from
    /// `OrderCreated`, so `process_event` never returns this variant; it is
    /// the `?` conversion target for the fallible core constructor.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// What a successfully dispatched event did to the order collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Created {
        order_id: OrderId,
        /// An order with the same id existed and was overwritten.
        replaced: bool,
    },
    Transitioned {
        order_id: OrderId,
        previous: OrderStatus,
        current: OrderStatus,
    },
}

/// Owns the order collection and the observer list for one replay.
///
/// Lookup failures are returned to the caller after being logged; they never
/// poison the processor and the next event is handled normally.
#[derive(Default)]
pub struct EventProcessor {
    orders: HashMap<OrderId, Order>,
    observers: Vec<Arc<dyn OrderObserver>>,
}

impl EventProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `observer`. Notification order is registration order and
    /// the same observer may be registered more than once.
    pub fn add_observer(&mut self, observer: Arc<dyn OrderObserver>) {
        self.observers.push(observer);
    }

    /// Drops the first registration of `observer`, compared by identity.
    pub fn remove_observer<O>(&mut self, observer: &Arc<O>) -> bool
    where
        O: OrderObserver + ?Sized,
    {
        let target = Arc::as_ptr(observer).cast::<()>();
        match self
            .observers
            .iter()
            .position(|o| Arc::as_ptr(o).cast::<()>() == target)
        {
            Some(index) => {
                self.observers.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn process_event(&mut self, event: Event) -> Result<Applied, ProcessError> {
        let event = Arc::new(event);
        debug!(event_id = %event.event_id(), event_type = %event.event_type(), "processing event");

        let outcome = match &event.payload {
            OrderEvent::OrderCreated(_) => self.create(Arc::clone(&event)),
            OrderEvent::PaymentReceived(payment) => {
                let paid = payment.amount_paid;
                self.transition(&event, |order| {
                    payment_status(order.status(), paid, order.total_amount())
                })
            }
            OrderEvent::ShippingScheduled(_) => self.transition(&event, |_| OrderStatus::Shipped),
            OrderEvent::OrderCancelled(_) => self.transition(&event, |_| OrderStatus::Cancelled),
        };

        let related = self.orders.get(event.order_id());
        for observer in &self.observers {
            observer.on_event_processed(&event, related);
        }

        outcome
    }

    /// Owned copy of the order collection; later processing does not touch it.
    pub fn get_orders(&self) -> HashMap<OrderId, Order> {
        self.orders.clone()
    }

    /// Read-only view of the live collection.
    pub fn orders(&self) -> &HashMap<OrderId, Order> {
        &self.orders
    }

    pub fn order(&self, order_id: &str) -> Option<&Order> {
        self.orders.get(order_id)
    }

    fn create(&mut self, event: Arc<Event>) -> Result<Applied, ProcessError> {
        let order = Order::open(event)?;
        let order_id = order.order_id().clone();
        info!(%order, "created new order");

        let replaced = self.orders.insert(order_id.clone(), order).is_some();
        if replaced {
            warn!(%order_id, "duplicate OrderCreated replaced existing order");
        }
        Ok(Applied::Created { order_id, replaced })
    }

    fn transition<F>(&mut self, event: &Arc<Event>, next: F) -> Result<Applied, ProcessError>
    where
        F: FnOnce(&Order) -> OrderStatus,
    {
        let Some(order) = self.orders.get_mut(event.order_id()) else {
            let err = ProcessError::OrderNotFound {
                order_id: event.order_id().clone(),
                event_id: event.event_id().to_string(),
                kind: event.event_type(),
            };
            warn!(%err, "skipping event");
            return Err(err);
        };

        let previous = order.status();
        let current = next(&*order);
        order.apply(Arc::clone(event), current);
        info!(
            order_id = %order.order_id(),
            event_type = %event.event_type(),
            %previous,
            %current,
            "order updated"
        );

        for observer in &self.observers {
            observer.on_order_status_changed(order, previous, current);
        }

        Ok(Applied::Transitioned {
            order_id: order.order_id().clone(),
            previous,
            current,
        })
    }
}
