use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId, TransactionId};
use domain::LoyaltyTransaction;

use crate::Result;

/// A customer profile record.
///
/// `points_balance` is the cached balance column: a read optimization kept
/// in step with appends, never the source of truth. `created_at` is what
/// segmentation derives account age from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerProfile {
    pub customer_id: CustomerId,
    pub points_balance: i64,
    pub created_at: DateTime<Utc>,
}

/// Core trait for ledger store implementations.
///
/// The store enforces the append-only discipline and the two idempotency
/// guards: at most one reversal per original transaction and at most one
/// accrual per order. Both guards are atomic with the insert, so concurrent
/// retries cannot slip a duplicate through. Every append also moves the
/// cached balance on the customer profile in the same unit of work.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Registers a customer profile. Idempotent: registering an existing
    /// customer is a no-op.
    async fn register_customer(&self, customer_id: CustomerId, created_at: DateTime<Utc>)
    -> Result<()>;

    /// Retrieves a customer profile.
    async fn get_customer(&self, customer_id: CustomerId) -> Result<Option<CustomerProfile>>;

    /// Appends a transaction and moves the cached balance atomically.
    ///
    /// Fails with `CustomerNotFound` for an unknown customer,
    /// `AlreadyReversed` if the transaction reverses an already-reversed
    /// original, and `DuplicateAccrual` if an accrual for the same order
    /// already exists.
    async fn append(&self, tx: &LoyaltyTransaction) -> Result<()>;

    /// Sums all of a customer's transaction points. This is the
    /// authoritative balance.
    async fn sum_points(&self, customer_id: CustomerId) -> Result<i64>;

    /// Retrieves a page of a customer's transactions, newest first.
    async fn history(
        &self,
        customer_id: CustomerId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LoyaltyTransaction>>;

    /// Retrieves a transaction by id.
    async fn get_transaction(&self, id: TransactionId) -> Result<Option<LoyaltyTransaction>>;

    /// Retrieves the reversal referencing `original`, if one exists.
    async fn find_reversal_of(&self, original: TransactionId)
    -> Result<Option<LoyaltyTransaction>>;

    /// Retrieves the (non-reversal) accrual tagged with `order_id`, if one
    /// exists.
    async fn find_order_accrual(&self, order_id: OrderId) -> Result<Option<LoyaltyTransaction>>;

    /// Overwrites the cached balance. Only the reconciliation path calls
    /// this; the ledger itself is untouched.
    async fn set_cached_balance(&self, customer_id: CustomerId, balance: i64) -> Result<()>;
}
