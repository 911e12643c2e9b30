use oe_core::{Amount, OrderStatus};

/// Status after a payment of `paid` against an order totalling `total`.
///
/// Each payment is judged on its own against the order total; earlier
/// payments are not accumulated. A short payment that is zero or negative leaves `current`
/// untouched.
pub fn payment_status(current: OrderStatus, paid: Amount, total: Amount) -> OrderStatus {
    if paid >= total {
        OrderStatus::Paid
    } else if paid > Amount::ZERO {
        OrderStatus::PartiallyPaid
    } else {
        current
    }
}
