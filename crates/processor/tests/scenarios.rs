use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use oe_core::{
    Event, EventKind, OrderCancelled, OrderCreated, OrderEvent, OrderItem, OrderStatus,
    PaymentReceived, ShippingScheduled,
};
use oe_observers::{Notification, RecordingObserver};
use oe_processor::{EventProcessor, ProcessError};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, 29, 10, minute, 0).unwrap()
}

fn create(id: &str, order_id: &str, total: i64, items: Vec<OrderItem>) -> Event {
    Event::new(
        id,
        at(0),
        OrderCreated {
            order_id: order_id.to_string(),
            customer_id: "CUST1".to_string(),
            items,
            total_amount: Decimal::from(total),
        },
    )
}

fn pay(id: &str, order_id: &str, amount: i64) -> Event {
    Event::new(
        id,
        at(5),
        PaymentReceived {
            order_id: order_id.to_string(),
            amount_paid: Decimal::from(amount),
        },
    )
}

fn ship(id: &str, order_id: &str) -> Event {
    Event::new(
        id,
        at(10),
        ShippingScheduled {
            order_id: order_id.to_string(),
            shipping_date: at(59),
        },
    )
}

fn cancel(id: &str, order_id: &str) -> Event {
    Event::new(
        id,
        at(15),
        OrderCancelled {
            order_id: order_id.to_string(),
            reason: "changed mind".to_string(),
        },
    )
}

fn processor() -> (EventProcessor, Arc<RecordingObserver>) {
    let mut processor = EventProcessor::new();
    let recorder = Arc::new(RecordingObserver::new());
    processor.add_observer(recorder.clone());
    (processor, recorder)
}

#[test]
fn partial_payments_do_not_accumulate() {
    let (mut processor, _) = processor();

    processor
        .process_event(create("e1", "ORD1", 100, vec![OrderItem::new("P1", 2)]))
        .unwrap();
    processor.process_event(pay("e2", "ORD1", 60)).unwrap();
    processor.process_event(pay("e3", "ORD1", 40)).unwrap();

    let orders = processor.get_orders();
    assert_eq!(orders["ORD1"].status(), OrderStatus::PartiallyPaid);
    assert_eq!(orders["ORD1"].event_history().len(), 3);
}

#[test]
fn payment_for_unknown_order_only_reports() {
    let (mut processor, recorder) = processor();

    let result = processor.process_event(pay("e1", "ORD_UNKNOWN", 50));

    assert!(matches!(result, Err(ProcessError::OrderNotFound { .. })));
    assert!(processor.get_orders().is_empty());
    assert_eq!(recorder.status_changes(), 0);
}

#[test]
fn cancellation_is_not_terminal() {
    let (mut processor, recorder) = processor();

    processor.process_event(create("e1", "ORD2", 50, vec![])).unwrap();
    processor.process_event(cancel("e2", "ORD2")).unwrap();
    processor.process_event(ship("e3", "ORD2")).unwrap();

    assert_eq!(processor.order("ORD2").unwrap().status(), OrderStatus::Shipped);
    let changes: Vec<_> = recorder
        .notifications()
        .into_iter()
        .filter(|n| matches!(n, Notification::StatusChanged { .. }))
        .collect();
    assert_eq!(
        changes,
        vec![
            Notification::StatusChanged {
                order_id: "ORD2".to_string(),
                previous: OrderStatus::Pending,
                new: OrderStatus::Cancelled,
            },
            Notification::StatusChanged {
                order_id: "ORD2".to_string(),
                previous: OrderStatus::Cancelled,
                new: OrderStatus::Shipped,
            },
        ]
    );
}

#[test]
fn mixed_batch_keeps_going_past_bad_references() {
    let (mut processor, recorder) = processor();
    let batch = vec![
        create("e1", "A", 100, vec![OrderItem::new("P1", 1)]),
        pay("e2", "B", 10),
        create("e3", "B", 20, vec![]),
        pay("e4", "A", 100),
        ship("e5", "A"),
        cancel("e6", "C"),
        pay("e7", "B", 5),
    ];

    let failures = batch
        .into_iter()
        .map(|event| processor.process_event(event))
        .filter(Result::is_err)
        .count();

    assert_eq!(failures, 2);
    let orders = processor.get_orders();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders["A"].status(), OrderStatus::Shipped);
    assert_eq!(orders["B"].status(), OrderStatus::PartiallyPaid);
    assert_eq!(recorder.events_processed(), 7);
    assert_eq!(recorder.status_changes(), 3);
}

#[derive(Debug, Clone)]
enum Step {
    Create(usize, i64),
    Pay(usize, i64),
    Ship(usize),
    Cancel(usize),
}

fn arb_step() -> impl Strategy<Value = Step> {
    let order = 0usize..4;
    prop_oneof![
        (order.clone(), 0i64..500).prop_map(|(o, t)| Step::Create(o, t)),
        (order.clone(), -50i64..600).prop_map(|(o, a)| Step::Pay(o, a)),
        order.clone().prop_map(Step::Ship),
        order.prop_map(Step::Cancel),
    ]
}

fn to_event(n: usize, step: &Step) -> Event {
    let id = format!("e{n}");
    match *step {
        Step::Create(o, total) => create(&id, &format!("ORD{o}"), total, vec![]),
        Step::Pay(o, amount) => pay(&id, &format!("ORD{o}"), amount),
        Step::Ship(o) => ship(&id, &format!("ORD{o}")),
        Step::Cancel(o) => cancel(&id, &format!("ORD{o}")),
    }
}

proptest! {
    #[test]
    fn history_always_starts_with_creation(steps in prop::collection::vec(arb_step(), 0..40)) {
        let (mut processor, _) = processor();
        for (n, step) in steps.iter().enumerate() {
            let _ = processor.process_event(to_event(n, step));
        }
        for order in processor.orders().values() {
            prop_assert_eq!(order.event_history()[0].event_type(), EventKind::OrderCreated);
        }
    }

    #[test]
    fn every_event_is_reported_once(steps in prop::collection::vec(arb_step(), 0..40)) {
        let (mut processor, recorder) = processor();
        let mut expected_changes = 0;
        for (n, step) in steps.iter().enumerate() {
            let event = to_event(n, step);
            let known = processor.order(event.order_id()).is_some();
            let creation = matches!(event.payload, OrderEvent::OrderCreated(_));
            let result = processor.process_event(event);
            if !creation && known {
                expected_changes += 1;
            }
            prop_assert_eq!(result.is_err(), !creation && !known);
        }
        prop_assert_eq!(recorder.events_processed(), steps.len());
        prop_assert_eq!(recorder.status_changes(), expected_changes);
    }

    #[test]
    fn unknown_orders_are_never_inserted(
        steps in prop::collection::vec(arb_step(), 0..40)
    ) {
        let (mut processor, _) = processor();
        let mut created = std::collections::HashSet::new();
        for (n, step) in steps.iter().enumerate() {
            if let Step::Create(o, _) = step {
                created.insert(format!("ORD{o}"));
            }
            let _ = processor.process_event(to_event(n, step));
            prop_assert!(processor.orders().keys().all(|id| created.contains(id)));
        }
    }

    #[test]
    fn ship_and_cancel_always_force_status(
        prefix in prop::collection::vec(arb_step(), 0..20),
        last_is_ship in any::<bool>(),
    ) {
        let (mut processor, _) = processor();
        processor.process_event(create("seed", "ORD0", 100, vec![])).unwrap();
        for (n, step) in prefix.iter().enumerate() {
            // keep ORD0 alive so the final event always resolves
            if !matches!(step, Step::Create(0, _)) {
                let _ = processor.process_event(to_event(n, step));
            }
        }
        let (last, expected) = if last_is_ship {
            (ship("last", "ORD0"), OrderStatus::Shipped)
        } else {
            (cancel("last", "ORD0"), OrderStatus::Cancelled)
        };
        processor.process_event(last).unwrap();
        prop_assert_eq!(processor.order("ORD0").unwrap().status(), expected);
    }
}
