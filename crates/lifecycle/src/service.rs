//! Lifecycle orchestration service.

use common::{OrderId, Version};
use domain::{Order, OrderStatus};
use ledger::{LedgerError, LedgerStore, LoyaltyLedger};
use order_store::{OrderStore, OrderStoreError};

use crate::policy::AccrualPolicy;
use crate::{LifecycleError, Result};

/// Orchestrates order status transitions and their loyalty side effects.
///
/// The transition sequence is: read the current order, validate the target
/// against the state machine (zero side effects on failure), write through
/// the store's version compare-and-set, then apply side effects. Because
/// the write is guarded by the version the caller read, two concurrent
/// transitions on the same order cannot both succeed against a stale
/// status.
pub struct OrderLifecycle<S, L, P>
where
    S: OrderStore,
    L: LedgerStore,
    P: AccrualPolicy,
{
    orders: S,
    ledger: LoyaltyLedger<L>,
    policy: P,
}

impl<S, L, P> OrderLifecycle<S, L, P>
where
    S: OrderStore,
    L: LedgerStore,
    P: AccrualPolicy,
{
    /// Creates a new lifecycle service.
    pub fn new(orders: S, ledger_store: L, policy: P) -> Self {
        Self {
            orders,
            ledger: LoyaltyLedger::new(ledger_store),
            policy,
        }
    }

    /// Returns a reference to the order store.
    pub fn orders(&self) -> &S {
        &self.orders
    }

    /// Returns a reference to the loyalty ledger service.
    pub fn ledger(&self) -> &LoyaltyLedger<L> {
        &self.ledger
    }

    /// Persists a new order. Orders start in `PendingPayment`.
    #[tracing::instrument(skip(self, order), fields(order_id = %order.id()))]
    pub async fn create_order(&self, order: &Order) -> Result<()> {
        self.orders.insert(order).await?;
        Ok(())
    }

    /// Loads an order by id.
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order> {
        Ok(self.orders.get(order_id).await?)
    }

    /// Applies a status transition.
    ///
    /// `expected_version` is the optimistic-concurrency token from the
    /// order the caller read. A `ConcurrencyConflict` means the order moved
    /// in the meantime — the caller should re-read and retry rather than
    /// assume the target state was not reached by someone else.
    ///
    /// Side effects run only after the write commits:
    /// - first arrival at `Delivered` posts one loyalty accrual,
    /// - `Cancelled`/`Returned` after a revenue state reverses the order's
    ///   accrual if one was posted, exactly once. Both effects are
    ///   idempotent under retries.
    #[tracing::instrument(skip(self))]
    pub async fn transition(
        &self,
        order_id: OrderId,
        target: OrderStatus,
        expected_version: Version,
    ) -> Result<Order> {
        let order = self.orders.get(order_id).await?;

        // Fail fast on a stale token; the store re-checks atomically at
        // write time.
        if order.version() != expected_version {
            return Err(OrderStoreError::ConcurrencyConflict {
                order_id,
                expected: expected_version,
                actual: order.version(),
            }
            .into());
        }

        // Validation before any persistence write
        order.validate_transition(target)?;
        let prior_status = order.status();

        let updated = self
            .orders
            .update_status(order_id, target, expected_version)
            .await?;
        metrics::counter!("order_transitions_total").increment(1);

        match target {
            OrderStatus::Delivered => self.accrue(&updated).await?,
            OrderStatus::Cancelled | OrderStatus::Returned
                if prior_status.counts_as_revenue() =>
            {
                self.compensate(order_id).await?;
            }
            _ => {}
        }

        Ok(updated)
    }

    /// Posts the delivery accrual for an order. Idempotent per order.
    async fn accrue(&self, order: &Order) -> Result<()> {
        let points = self.policy.accrual_points(order);
        if points <= 0 {
            return Ok(());
        }

        let concept = format!("Points earned for order {}", order.order_number());
        let tx = self
            .ledger
            .append_accrual(order.customer_id(), order.id(), points, concept)
            .await?;

        tracing::info!(
            order_id = %order.id(),
            transaction_id = %tx.id,
            points = tx.points,
            "loyalty accrual posted"
        );
        Ok(())
    }

    /// Reverses the order's accrual if one was posted. Exactly-once even
    /// when the reversal request is retried.
    async fn compensate(&self, order_id: OrderId) -> Result<()> {
        let Some(accrual) = self.ledger.store().find_order_accrual(order_id).await? else {
            return Ok(());
        };

        match self.ledger.reverse_transaction(accrual.id).await {
            Ok(reversal) => {
                tracing::info!(
                    order_id = %order_id,
                    transaction_id = %reversal.id,
                    points = reversal.points,
                    "loyalty accrual reversed"
                );
                Ok(())
            }
            // A retried compensation finds the reversal already posted;
            // that is the idempotent success case.
            Err(LedgerError::AlreadyReversed { .. }) => Ok(()),
            Err(e) => Err(LifecycleError::Ledger(e)),
        }
    }
}
