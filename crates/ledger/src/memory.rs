use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId, TransactionId};
use domain::{LoyaltyTransaction, TransactionSource};
use tokio::sync::RwLock;

use crate::{CustomerProfile, LedgerError, LedgerStore, Result};

/// In-memory ledger store implementation for testing.
///
/// Mirrors the PostgreSQL implementation's semantics: the idempotency
/// checks, the insert and the cached-balance update all happen under one
/// write lock.
#[derive(Clone, Default)]
pub struct InMemoryLedgerStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    customers: HashMap<CustomerId, CustomerProfile>,
    transactions: Vec<LoyaltyTransaction>,
}

impl InMemoryLedgerStore {
    /// Creates a new empty in-memory ledger store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of transactions stored.
    pub async fn transaction_count(&self) -> usize {
        self.inner.read().await.transactions.len()
    }

    /// Corrupts the cached balance without touching the ledger. Exists so
    /// tests can exercise the reconciliation path.
    pub async fn corrupt_cached_balance(&self, customer_id: CustomerId, balance: i64) {
        if let Some(profile) = self.inner.write().await.customers.get_mut(&customer_id) {
            profile.points_balance = balance;
        }
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn register_customer(
        &self,
        customer_id: CustomerId,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        self.inner
            .write()
            .await
            .customers
            .entry(customer_id)
            .or_insert(CustomerProfile {
                customer_id,
                points_balance: 0,
                created_at,
            });
        Ok(())
    }

    async fn get_customer(&self, customer_id: CustomerId) -> Result<Option<CustomerProfile>> {
        Ok(self.inner.read().await.customers.get(&customer_id).cloned())
    }

    async fn append(&self, tx: &LoyaltyTransaction) -> Result<()> {
        let mut inner = self.inner.write().await;

        if !inner.customers.contains_key(&tx.customer_id) {
            return Err(LedgerError::CustomerNotFound(tx.customer_id));
        }

        if let Some(original) = tx.reverses
            && inner.transactions.iter().any(|t| t.reverses == Some(original))
        {
            return Err(LedgerError::AlreadyReversed { original });
        }

        if let Some(order_id) = tx.order_id
            && tx.source == TransactionSource::Purchase
            && tx.reverses.is_none()
            && inner.transactions.iter().any(|t| {
                t.order_id == Some(order_id)
                    && t.source == TransactionSource::Purchase
                    && t.reverses.is_none()
            })
        {
            return Err(LedgerError::DuplicateAccrual { order_id });
        }

        inner.transactions.push(tx.clone());
        if let Some(profile) = inner.customers.get_mut(&tx.customer_id) {
            profile.points_balance += tx.points;
        }
        Ok(())
    }

    async fn sum_points(&self, customer_id: CustomerId) -> Result<i64> {
        Ok(self
            .inner
            .read()
            .await
            .transactions
            .iter()
            .filter(|t| t.customer_id == customer_id)
            .map(|t| t.points)
            .sum())
    }

    async fn history(
        &self,
        customer_id: CustomerId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LoyaltyTransaction>> {
        let inner = self.inner.read().await;
        let mut entries: Vec<_> = inner
            .transactions
            .iter()
            .filter(|t| t.customer_id == customer_id)
            .cloned()
            .collect();
        // Newest first; ties on created_at break by id descending, the same
        // page order the PostgreSQL store produces
        entries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.as_uuid().cmp(&a.id.as_uuid()))
        });
        Ok(entries.into_iter().skip(offset).take(limit).collect())
    }

    async fn get_transaction(&self, id: TransactionId) -> Result<Option<LoyaltyTransaction>> {
        Ok(self
            .inner
            .read()
            .await
            .transactions
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }

    async fn find_reversal_of(
        &self,
        original: TransactionId,
    ) -> Result<Option<LoyaltyTransaction>> {
        Ok(self
            .inner
            .read()
            .await
            .transactions
            .iter()
            .find(|t| t.reverses == Some(original))
            .cloned())
    }

    async fn find_order_accrual(&self, order_id: OrderId) -> Result<Option<LoyaltyTransaction>> {
        Ok(self
            .inner
            .read()
            .await
            .transactions
            .iter()
            .find(|t| {
                t.order_id == Some(order_id)
                    && t.source == TransactionSource::Purchase
                    && t.reverses.is_none()
            })
            .cloned())
    }

    async fn set_cached_balance(&self, customer_id: CustomerId, balance: i64) -> Result<()> {
        let mut inner = self.inner.write().await;
        let profile = inner
            .customers
            .get_mut(&customer_id)
            .ok_or(LedgerError::CustomerNotFound(customer_id))?;
        profile.points_balance = balance;
        Ok(())
    }
}
