use async_trait::async_trait;
use common::{CustomerId, OrderId, Version};
use domain::{Order, OrderStatus};

use crate::Result;

/// Core trait for order store implementations.
///
/// The store is the single writer for order rows. Status writes are a
/// compare-and-set on the order's [`Version`]: the caller validates the
/// transition against the snapshot it read, then passes that snapshot's
/// version; the write fails with `ConcurrencyConflict` if anything else
/// committed in between. External code must never write `status` directly —
/// it goes through the lifecycle service, which performs the state-machine
/// validation before calling [`OrderStore::update_status`].
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts a new order.
    ///
    /// Fails with `OrderAlreadyExists` if the id is taken and
    /// `DuplicateOrderNumber` if the order number is taken.
    async fn insert(&self, order: &Order) -> Result<()>;

    /// Retrieves an order by id.
    async fn get(&self, order_id: OrderId) -> Result<Order>;

    /// Retrieves an order by its human-readable order number.
    async fn get_by_number(&self, order_number: &str) -> Result<Order>;

    /// Retrieves all orders for a customer, oldest first.
    async fn list_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>>;

    /// Writes a new status for the order, guarded by the expected version.
    ///
    /// Atomically checks that the stored version equals `expected_version`,
    /// then writes the status, bumps the version and refreshes `updated_at`.
    /// Fails with `ConcurrencyConflict` if the version moved, and
    /// `OrderNotFound` if the order does not exist.
    ///
    /// Returns the updated order.
    async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
        expected_version: Version,
    ) -> Result<Order>;
}
