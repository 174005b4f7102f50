//! Customer statistics aggregation.

use chrono::{DateTime, Utc};
use common::{CustomerId, Money};
use order_store::{OrderStore, Result};

use crate::{Segment, classify};

/// Aggregate inputs for segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomerStats {
    /// Sum of order totals over revenue statuses (paid through delivered;
    /// pending, cancelled and returned orders do not count).
    pub lifetime_value: Money,

    /// Total number of orders the customer ever placed.
    pub order_count: u64,

    /// Days since the account was created.
    pub antiquity_days: i64,
}

/// Derives a customer's statistics from their order history.
///
/// `account_created_at` comes from the customer profile; `now` is passed in
/// so read paths stay deterministic and testable.
pub async fn customer_stats<S: OrderStore>(
    store: &S,
    customer_id: CustomerId,
    account_created_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<CustomerStats> {
    let orders = store.list_by_customer(customer_id).await?;

    let lifetime_value = orders
        .iter()
        .filter(|o| o.status().counts_as_revenue())
        .map(|o| o.total_amount())
        .sum();

    Ok(CustomerStats {
        lifetime_value,
        order_count: orders.len() as u64,
        antiquity_days: (now - account_created_at).num_days(),
    })
}

/// Derives statistics and classifies in one step. Read-only; never persists
/// the label.
pub async fn segment_customer<S: OrderStore>(
    store: &S,
    customer_id: CustomerId,
    account_created_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<Segment> {
    let stats = customer_stats(store, customer_id, account_created_at, now).await?;
    Ok(classify(&stats))
}
