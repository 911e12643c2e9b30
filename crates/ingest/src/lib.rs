//! Line-delimited JSON ingestion: one event object per line.
//!
//! Bad input is never fatal. [`parse_event`] reports why a single line was
//! rejected and [`EventReader`] logs and skips such lines, yielding only the
//! events that decoded cleanly.

use oe_core::{
    Event, EventKind, EventMeta, OrderCancelled, OrderCreated, OrderEvent, PaymentReceived,
    ShippingScheduled,
};
use serde::Deserialize;
use serde_json::Value;

mod reader;

pub use reader::{read_events, EventReader};

#[derive(thiserror::Error, Debug)]
pub enum IngestError {
    #[error("blank line")]
    Empty,
    #[error("malformed JSON: {0}")]
    Json(#[source] serde_json::Error),
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },
    #[error("field `{field}` {reason}")]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },
    #[error("unknown event type '{event_type}' for eventId '{}'", event_id.as_deref().unwrap_or("?"))]
    UnsupportedEventType {
        event_type: String,
        event_id: Option<String>,
    },
    #[error("invalid {kind} record: {source}")]
    InvalidRecord {
        kind: EventKind,
        #[source]
        source: serde_json::Error,
    },
}

/// Decodes one line into an event.
pub fn parse_event(line: &str) -> Result<Event, IngestError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(IngestError::Empty);
    }
    let value: Value = serde_json::from_str(line).map_err(IngestError::Json)?;
    if !value.is_object() {
        return Err(IngestError::NotAnObject);
    }

    let kind = event_kind(&value)?;
    let invalid = |source| IngestError::InvalidRecord { kind, source };

    let meta = EventMeta::deserialize(&value).map_err(invalid)?;
    let payload = match kind {
        EventKind::OrderCreated => OrderCreated::deserialize(&value).map(OrderEvent::from),
        EventKind::PaymentReceived => PaymentReceived::deserialize(&value).map(OrderEvent::from),
        EventKind::ShippingScheduled => {
            ShippingScheduled::deserialize(&value).map(OrderEvent::from)
        }
        EventKind::OrderCancelled => OrderCancelled::deserialize(&value).map(OrderEvent::from),
    }
    .map_err(invalid)?;

    Ok(Event { meta, payload })
}

fn event_kind(value: &Value) -> Result<EventKind, IngestError> {
    let raw = value
        .get("eventType")
        .ok_or(IngestError::MissingField { field: "eventType" })?
        .as_str()
        .ok_or(IngestError::InvalidField {
            field: "eventType",
            reason: "must be a string",
        })?;
    raw.parse()
        .map_err(|_| IngestError::UnsupportedEventType {
            event_type: raw.to_string(),
            event_id: value
                .get("eventId")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
}
