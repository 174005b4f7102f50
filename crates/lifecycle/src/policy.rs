//! Accrual policy.
//!
//! How many points a delivered order earns is business policy, not a core
//! invariant, so it is injected into the lifecycle service rather than
//! hard-coded.

use domain::Order;

/// Decides how many points a delivered order accrues.
pub trait AccrualPolicy: Send + Sync {
    /// Points to credit when the order reaches `Delivered`. A result of
    /// zero or less means no accrual is posted.
    fn accrual_points(&self, order: &Order) -> i64;
}

/// Credits a percentage of the order total, one point per whole currency
/// unit. A 5% policy on a $300.00 order yields 15 points.
#[derive(Debug, Clone, Copy)]
pub struct PercentageAccrual {
    percent: u32,
}

impl PercentageAccrual {
    /// Creates a policy crediting `percent`% of the order total.
    pub fn new(percent: u32) -> Self {
        Self { percent }
    }
}

impl AccrualPolicy for PercentageAccrual {
    fn accrual_points(&self, order: &Order) -> i64 {
        // cents -> whole currency units, then the percentage
        order.total_amount().cents() * self.percent as i64 / 10_000
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::{CustomerId, Money, OrderId};
    use domain::Address;

    fn order_with_total(cents: i64) -> Order {
        let address = Address::new("1 Main St", "Springfield", "IL", "62701", "US");
        Order::new(
            OrderId::new(),
            "ORD-1",
            CustomerId::new(),
            vec![],
            Money::from_cents(cents),
            address.clone(),
            address,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn five_percent_of_three_hundred_dollars() {
        let policy = PercentageAccrual::new(5);
        assert_eq!(policy.accrual_points(&order_with_total(30_000)), 15);
    }

    #[test]
    fn small_totals_round_down_to_zero() {
        let policy = PercentageAccrual::new(5);
        assert_eq!(policy.accrual_points(&order_with_total(1_500)), 0);
    }
}
