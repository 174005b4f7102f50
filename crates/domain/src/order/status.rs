//! Order lifecycle state machine.

use serde::{Deserialize, Serialize};

use super::OrderError;

/// The status of an order in its lifecycle.
///
/// Legal transitions:
/// ```text
/// PendingPayment ──► Paid ──► Preparing ──► ReadyToShip ──► Shipped ──► Delivered
///       │             │          │              │              │            │
///       └─────────────┴──────────┴──────────────┴──► Cancelled │            │
///                                                              └────────────┴──► Returned
/// ```
///
/// The happy path is strictly sequential; no stage may be skipped.
/// `Cancelled` and `Returned` are terminal. A shipped or delivered order
/// cannot be cancelled, only returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order created, awaiting payment. Items can still be modified.
    PendingPayment,

    /// Payment confirmed.
    Paid,

    /// Order is being prepared for shipment.
    Preparing,

    /// Order is packed and ready to hand to the carrier.
    ReadyToShip,

    /// Order is with the carrier.
    Shipped,

    /// Order reached the customer. Triggers loyalty accrual.
    Delivered,

    /// Order was cancelled before shipping (terminal).
    Cancelled,

    /// Order was returned after shipping or delivery (terminal).
    Returned,
}

impl OrderStatus {
    /// All known statuses, in happy-path order followed by the terminals.
    pub const ALL: [OrderStatus; 8] = [
        OrderStatus::PendingPayment,
        OrderStatus::Paid,
        OrderStatus::Preparing,
        OrderStatus::ReadyToShip,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
        OrderStatus::Returned,
    ];

    /// Returns true if `target` is directly reachable from this status.
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        use OrderStatus::*;

        match (self, target) {
            // Happy path, strictly sequential
            (PendingPayment, Paid)
            | (Paid, Preparing)
            | (Preparing, ReadyToShip)
            | (ReadyToShip, Shipped)
            | (Shipped, Delivered) => true,

            // Cancellation is only possible before the order ships
            (PendingPayment | Paid | Preparing | ReadyToShip, Cancelled) => true,

            // Once shipped, the only exit besides delivery is a return
            (Shipped | Delivered, Returned) => true,

            _ => false,
        }
    }

    /// Returns true if this is a terminal status (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Cancelled | OrderStatus::Returned)
    }

    /// Returns true if orders in this status count towards customer revenue.
    ///
    /// Pending-payment and cancelled orders never produced revenue; returned
    /// orders did reach a revenue status before the return and stay excluded
    /// here because the order is no longer revenue once returned.
    pub fn counts_as_revenue(&self) -> bool {
        matches!(
            self,
            OrderStatus::Paid
                | OrderStatus::Preparing
                | OrderStatus::ReadyToShip
                | OrderStatus::Shipped
                | OrderStatus::Delivered
        )
    }

    /// Returns true if items can be modified in this status.
    pub fn items_mutable(&self) -> bool {
        matches!(self, OrderStatus::PendingPayment)
    }

    /// Returns the wire/column representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::PendingPayment => "pending_payment",
            OrderStatus::Paid => "paid",
            OrderStatus::Preparing => "preparing",
            OrderStatus::ReadyToShip => "ready_to_ship",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Returned => "returned",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = OrderError;

    /// Parses the wire/column representation.
    ///
    /// Anything outside the known set is a hard error. A status is never
    /// coerced to a default stage.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_payment" => Ok(OrderStatus::PendingPayment),
            "paid" => Ok(OrderStatus::Paid),
            "preparing" => Ok(OrderStatus::Preparing),
            "ready_to_ship" => Ok(OrderStatus::ReadyToShip),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            "returned" => Ok(OrderStatus::Returned),
            other => Err(OrderError::UnknownStatus(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_is_strictly_sequential() {
        let path = [
            OrderStatus::PendingPayment,
            OrderStatus::Paid,
            OrderStatus::Preparing,
            OrderStatus::ReadyToShip,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ];

        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }

        // No skipping stages
        assert!(!OrderStatus::PendingPayment.can_transition_to(OrderStatus::Preparing));
        assert!(!OrderStatus::Paid.can_transition_to(OrderStatus::Shipped));
        assert!(!OrderStatus::Paid.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Preparing.can_transition_to(OrderStatus::Delivered));

        // No moving backwards
        assert!(!OrderStatus::Paid.can_transition_to(OrderStatus::PendingPayment));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Shipped));
    }

    #[test]
    fn cancellation_only_before_shipping() {
        assert!(OrderStatus::PendingPayment.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Paid.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Preparing.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::ReadyToShip.can_transition_to(OrderStatus::Cancelled));

        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn returns_only_after_shipping() {
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Returned));
        assert!(OrderStatus::Delivered.can_transition_to(OrderStatus::Returned));

        assert!(!OrderStatus::PendingPayment.can_transition_to(OrderStatus::Returned));
        assert!(!OrderStatus::Paid.can_transition_to(OrderStatus::Returned));
        assert!(!OrderStatus::Preparing.can_transition_to(OrderStatus::Returned));
        assert!(!OrderStatus::ReadyToShip.can_transition_to(OrderStatus::Returned));
    }

    #[test]
    fn terminal_states_have_no_exits() {
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(OrderStatus::Returned.is_terminal());

        for target in OrderStatus::ALL {
            assert!(!OrderStatus::Cancelled.can_transition_to(target));
            assert!(!OrderStatus::Returned.can_transition_to(target));
        }
    }

    #[test]
    fn revenue_statuses() {
        assert!(!OrderStatus::PendingPayment.counts_as_revenue());
        assert!(OrderStatus::Paid.counts_as_revenue());
        assert!(OrderStatus::Preparing.counts_as_revenue());
        assert!(OrderStatus::ReadyToShip.counts_as_revenue());
        assert!(OrderStatus::Shipped.counts_as_revenue());
        assert!(OrderStatus::Delivered.counts_as_revenue());
        assert!(!OrderStatus::Cancelled.counts_as_revenue());
        assert!(!OrderStatus::Returned.counts_as_revenue());
    }

    #[test]
    fn items_mutable_only_pending_payment() {
        assert!(OrderStatus::PendingPayment.items_mutable());
        for status in OrderStatus::ALL {
            if status != OrderStatus::PendingPayment {
                assert!(!status.items_mutable(), "{status}");
            }
        }
    }

    #[test]
    fn string_roundtrip() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_is_a_hard_error() {
        let err = "refunded".parse::<OrderStatus>().unwrap_err();
        assert!(matches!(err, OrderError::UnknownStatus(s) if s == "refunded"));

        // Empty strings are rejected too, not treated as the first stage
        assert!("".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&OrderStatus::ReadyToShip).unwrap();
        assert_eq!(json, "\"ready_to_ship\"");
        let back: OrderStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, OrderStatus::ReadyToShip);
    }
}
