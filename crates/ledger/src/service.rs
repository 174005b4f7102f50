//! Loyalty ledger service.

use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId, TransactionId};
use domain::{LoyaltyTransaction, TransactionSource};

use crate::{CustomerProfile, LedgerError, LedgerStore, Result};

/// High-level API over a [`LedgerStore`].
///
/// This service is the only writer to the ledger; callers never insert
/// transactions directly. It validates inputs, keeps reversals and
/// order-driven accruals idempotent, and reconciles the cached balance
/// against the authoritative sum.
pub struct LoyaltyLedger<S: LedgerStore> {
    store: S,
}

impl<S: LedgerStore> LoyaltyLedger<S> {
    /// Creates a new ledger service with the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Registers a customer profile. Idempotent.
    #[tracing::instrument(skip(self))]
    pub async fn register_customer(
        &self,
        customer_id: CustomerId,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        self.store.register_customer(customer_id, created_at).await
    }

    /// Loads a customer profile.
    pub async fn get_customer(&self, customer_id: CustomerId) -> Result<CustomerProfile> {
        self.store
            .get_customer(customer_id)
            .await?
            .ok_or(LedgerError::CustomerNotFound(customer_id))
    }

    /// Appends a signed point delta to a customer's ledger.
    ///
    /// Rejects zero points and empty concepts with a validation error, and
    /// unknown customers with `CustomerNotFound`.
    #[tracing::instrument(skip(self, concept))]
    pub async fn append_transaction(
        &self,
        customer_id: CustomerId,
        points: i64,
        concept: impl Into<String>,
        source: TransactionSource,
    ) -> Result<LoyaltyTransaction> {
        let tx = LoyaltyTransaction::new(customer_id, points, concept, source, Utc::now())?;
        self.store.append(&tx).await?;
        metrics::counter!("ledger_appends_total").increment(1);
        Ok(tx)
    }

    /// Returns the customer's balance: the sum of all their transactions.
    ///
    /// The cached balance column is never consulted here — the ledger sum
    /// is the truth.
    #[tracing::instrument(skip(self))]
    pub async fn get_balance(&self, customer_id: CustomerId) -> Result<i64> {
        // Distinguish an unknown customer from one with an empty ledger
        self.get_customer(customer_id).await?;
        self.store.sum_points(customer_id).await
    }

    /// Returns the cached balance column as-is, untrusted.
    pub async fn cached_balance(&self, customer_id: CustomerId) -> Result<i64> {
        Ok(self.get_customer(customer_id).await?.points_balance)
    }

    /// Compares the cached balance to the ledger sum, repairing the cache
    /// on drift. Returns the authoritative sum either way.
    #[tracing::instrument(skip(self))]
    pub async fn reconcile_balance(&self, customer_id: CustomerId) -> Result<i64> {
        let profile = self.get_customer(customer_id).await?;
        let sum = self.store.sum_points(customer_id).await?;

        if profile.points_balance != sum {
            tracing::warn!(
                customer_id = %customer_id,
                cached = profile.points_balance,
                actual = sum,
                "cached balance drifted from ledger; repairing"
            );
            self.store.set_cached_balance(customer_id, sum).await?;
        }

        Ok(sum)
    }

    /// Returns a page of the customer's transactions, newest first.
    /// Read-only; never mutates.
    #[tracing::instrument(skip(self))]
    pub async fn get_history(
        &self,
        customer_id: CustomerId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LoyaltyTransaction>> {
        self.store.history(customer_id, limit, offset).await
    }

    /// Appends the reversal of an existing transaction.
    ///
    /// The reversal negates the original's points and references its id. A
    /// second reversal of the same original fails with `AlreadyReversed`;
    /// the guard is atomic with the insert, so concurrent retries cannot
    /// double-reverse. Callers that retry treat `AlreadyReversed` as
    /// success.
    #[tracing::instrument(skip(self))]
    pub async fn reverse_transaction(
        &self,
        original_id: TransactionId,
    ) -> Result<LoyaltyTransaction> {
        let original = self
            .store
            .get_transaction(original_id)
            .await?
            .ok_or(LedgerError::TransactionNotFound(original_id))?;

        let reversal = LoyaltyTransaction::reversal_of(&original, Utc::now());
        self.store.append(&reversal).await?;
        metrics::counter!("loyalty_reversals_total").increment(1);
        Ok(reversal)
    }

    /// Appends an order-tagged accrual, idempotently.
    ///
    /// If an accrual for the order already exists (including one appended
    /// by a concurrent retry that won the race), it is returned as-is and
    /// nothing new is written.
    #[tracing::instrument(skip(self, concept))]
    pub async fn append_accrual(
        &self,
        customer_id: CustomerId,
        order_id: OrderId,
        points: i64,
        concept: impl Into<String>,
    ) -> Result<LoyaltyTransaction> {
        if let Some(existing) = self.store.find_order_accrual(order_id).await? {
            return Ok(existing);
        }

        let tx = LoyaltyTransaction::accrual(customer_id, order_id, points, concept, Utc::now())?;
        match self.store.append(&tx).await {
            Ok(()) => {
                metrics::counter!("loyalty_accruals_total").increment(1);
                Ok(tx)
            }
            Err(LedgerError::DuplicateAccrual { .. }) => {
                // Lost the race; the winner's accrual is the real one
                self.store
                    .find_order_accrual(order_id)
                    .await?
                    .ok_or(LedgerError::DuplicateAccrual { order_id })
            }
            Err(e) => Err(e),
        }
    }
}
