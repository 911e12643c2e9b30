use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{Amount, CoreError, CustomerId, Event, ItemId, OrderEvent, OrderId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(deserialize_with = "crate::text::deserialize")]
    pub item_id: ItemId,
    /// Taken as given, sign included.
    #[serde(rename = "qty", alias = "quantity")]
    pub quantity: i32,
}

impl OrderItem {
    pub fn new(item_id: impl Into<ItemId>, quantity: i32) -> Self {
        Self {
            item_id: item_id.into(),
            quantity,
        }
    }
}

/// Not ordered: any event may move an order to any status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Paid,
    PartiallyPaid,
    Shipped,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Paid => "PAID",
            OrderStatus::PartiallyPaid => "PARTIALLY_PAID",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate state of one order, derived by folding its event history.
///
/// Identity, items and total are fixed by the `OrderCreated` event that
/// opened the order. The history is append-only and always starts with that
/// event, which is why `Order::open` is the only constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    order_id: OrderId,
    customer_id: CustomerId,
    items: Vec<OrderItem>,
    total_amount: Amount,
    status: OrderStatus,
    event_history: Vec<Arc<Event>>,
}

impl Order {
    /// Opens a `PENDING` order from its creation event.
    pub fn open(event: impl Into<Arc<Event>>) -> Result<Self, CoreError> {
        let event = event.into();
        let OrderEvent::OrderCreated(created) = &event.payload else {
            return Err(CoreError::NotACreationEvent {
                event_id: event.meta.event_id.clone(),
                kind: event.event_type(),
            });
        };
        Ok(Self {
            order_id: created.order_id.clone(),
            customer_id: created.customer_id.clone(),
            items: created.items.clone(),
            total_amount: created.total_amount,
            status: OrderStatus::Pending,
            event_history: vec![event],
        })
    }

    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    pub fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn total_amount(&self) -> Amount {
        self.total_amount
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Every event applied to this order, in processing order.
    pub fn event_history(&self) -> &[Arc<Event>] {
        &self.event_history
    }

    pub fn latest_event(&self) -> Option<&Event> {
        self.event_history.last().map(Arc::as_ref)
    }

    /// Records `event` and moves the order to `status`.
    ///
    /// Status is not derived here; the caller decides the transition.
    pub fn apply(&mut self, event: Arc<Event>, status: OrderStatus) {
        self.status = status;
        self.event_history.push(event);
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order{{orderId='{}', customerId='{}', status={}, totalAmount={:.2}, items={}}}",
            self.order_id,
            self.customer_id,
            self.status,
            self.total_amount,
            self.items.len()
        )
    }
}
