use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::order::OrderItem;
use crate::{Amount, CoreError, CustomerId, EventEnvelope, EventId, EventMeta, OrderId};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EventKind {
    OrderCreated,
    PaymentReceived,
    ShippingScheduled,
    OrderCancelled,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::OrderCreated,
        EventKind::PaymentReceived,
        EventKind::ShippingScheduled,
        EventKind::OrderCancelled,
    ];

    /// Discriminator string used on the wire (`eventType`).
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::OrderCreated => "OrderCreated",
            EventKind::PaymentReceived => "PaymentReceived",
            EventKind::ShippingScheduled => "ShippingScheduled",
            EventKind::OrderCancelled => "OrderCancelled",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CoreError::UnsupportedEventType {
                event_type: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    #[serde(deserialize_with = "crate::text::deserialize")]
    pub order_id: OrderId,
    #[serde(deserialize_with = "crate::text::deserialize")]
    pub customer_id: CustomerId,
    pub items: Vec<OrderItem>,
    /// Taken as given; not reconciled against `items`.
    pub total_amount: Amount,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceived {
    #[serde(deserialize_with = "crate::text::deserialize")]
    pub order_id: OrderId,
    pub amount_paid: Amount,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShippingScheduled {
    #[serde(deserialize_with = "crate::text::deserialize")]
    pub order_id: OrderId,
    #[serde(deserialize_with = "crate::datetime::deserialize")]
    pub shipping_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderCancelled {
    #[serde(deserialize_with = "crate::text::deserialize")]
    pub order_id: OrderId,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "eventType")]
pub enum OrderEvent {
    OrderCreated(OrderCreated),
    PaymentReceived(PaymentReceived),
    ShippingScheduled(ShippingScheduled),
    OrderCancelled(OrderCancelled),
}

impl OrderEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            OrderEvent::OrderCreated(_) => EventKind::OrderCreated,
            OrderEvent::PaymentReceived(_) => EventKind::PaymentReceived,
            OrderEvent::ShippingScheduled(_) => EventKind::ShippingScheduled,
            OrderEvent::OrderCancelled(_) => EventKind::OrderCancelled,
        }
    }

    /// Every kind targets exactly one order.
    pub fn order_id(&self) -> &OrderId {
        match self {
            OrderEvent::OrderCreated(e) => &e.order_id,
            OrderEvent::PaymentReceived(e) => &e.order_id,
            OrderEvent::ShippingScheduled(e) => &e.order_id,
            OrderEvent::OrderCancelled(e) => &e.order_id,
        }
    }
}

impl From<OrderCreated> for OrderEvent {
    fn from(event: OrderCreated) -> Self {
        OrderEvent::OrderCreated(event)
    }
}

impl From<PaymentReceived> for OrderEvent {
    fn from(event: PaymentReceived) -> Self {
        OrderEvent::PaymentReceived(event)
    }
}

impl From<ShippingScheduled> for OrderEvent {
    fn from(event: ShippingScheduled) -> Self {
        OrderEvent::ShippingScheduled(event)
    }
}

impl From<OrderCancelled> for OrderEvent {
    fn from(event: OrderCancelled) -> Self {
        OrderEvent::OrderCancelled(event)
    }
}

/// An immutable fact about one order, as read from the input stream.
pub type Event = EventEnvelope<OrderEvent>;

impl EventEnvelope<OrderEvent> {
    pub fn new(
        event_id: impl Into<EventId>,
        timestamp: DateTime<Utc>,
        payload: impl Into<OrderEvent>,
    ) -> Self {
        Self {
            meta: EventMeta {
                event_id: event_id.into(),
                timestamp,
            },
            payload: payload.into(),
        }
    }

    pub fn event_id(&self) -> &str {
        &self.meta.event_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.meta.timestamp
    }

    pub fn event_type(&self) -> EventKind {
        self.payload.kind()
    }

    pub fn order_id(&self) -> &OrderId {
        self.payload.order_id()
    }
}
