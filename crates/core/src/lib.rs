//! Core types for order event replay: the event taxonomy, the order aggregate
//! and the identifiers shared between them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod datetime;
pub mod events;
pub mod order;
pub mod text;

pub use events::{
    Event, EventKind, OrderCancelled, OrderCreated, OrderEvent, PaymentReceived,
    ShippingScheduled,
};
pub use order::{Order, OrderItem, OrderStatus};

pub type EventId = String;
pub type OrderId = String;
pub type CustomerId = String;
pub type ItemId = String;

/// Monetary amounts. Exact decimal, never validated for sign.
pub type Amount = rust_decimal::Decimal;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventMeta {
    #[serde(deserialize_with = "text::deserialize")]
    pub event_id: EventId,
    #[serde(deserialize_with = "datetime::deserialize")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventEnvelope<T> {
    pub meta: EventMeta,
    pub payload: T,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("unsupported event type '{event_type}'")]
    UnsupportedEventType { event_type: String },
    #[error("event {event_id} is a {kind} event, orders can only be opened by OrderCreated")]
    NotACreationEvent { event_id: EventId, kind: EventKind },
}
