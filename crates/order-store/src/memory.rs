use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{CustomerId, OrderId, Version};
use domain::{Order, OrderStatus};
use tokio::sync::RwLock;

use crate::{OrderStore, OrderStoreError, Result};

/// In-memory order store implementation for testing.
///
/// Provides the same interface and concurrency semantics as the PostgreSQL
/// implementation: the version check and the status write happen under a
/// single write lock.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    orders: HashMap<OrderId, Order>,
    by_number: HashMap<String, OrderId>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.inner.read().await.orders.len()
    }

    /// Clears all orders.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.orders.clear();
        inner.by_number.clear();
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: &Order) -> Result<()> {
        let mut inner = self.inner.write().await;

        if inner.orders.contains_key(&order.id()) {
            return Err(OrderStoreError::OrderAlreadyExists(order.id()));
        }

        if inner.by_number.contains_key(order.order_number()) {
            return Err(OrderStoreError::DuplicateOrderNumber(
                order.order_number().to_string(),
            ));
        }

        inner
            .by_number
            .insert(order.order_number().to_string(), order.id());
        inner.orders.insert(order.id(), order.clone());
        Ok(())
    }

    async fn get(&self, order_id: OrderId) -> Result<Order> {
        self.inner
            .read()
            .await
            .orders
            .get(&order_id)
            .cloned()
            .ok_or(OrderStoreError::OrderNotFound(order_id))
    }

    async fn get_by_number(&self, order_number: &str) -> Result<Order> {
        let inner = self.inner.read().await;
        inner
            .by_number
            .get(order_number)
            .and_then(|id| inner.orders.get(id))
            .cloned()
            .ok_or_else(|| OrderStoreError::OrderNumberNotFound(order_number.to_string()))
    }

    async fn list_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>> {
        let inner = self.inner.read().await;
        let mut orders: Vec<_> = inner
            .orders
            .values()
            .filter(|o| o.customer_id() == customer_id)
            .cloned()
            .collect();
        orders.sort_by_key(|o| o.created_at());
        Ok(orders)
    }

    async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
        expected_version: Version,
    ) -> Result<Order> {
        let mut inner = self.inner.write().await;

        let order = inner
            .orders
            .get_mut(&order_id)
            .ok_or(OrderStoreError::OrderNotFound(order_id))?;

        if order.version() != expected_version {
            return Err(OrderStoreError::ConcurrencyConflict {
                order_id,
                expected: expected_version,
                actual: order.version(),
            });
        }

        // The caller validated the transition against this exact version;
        // the store's job is only the guarded row write.
        let updated = Order::from_storage(
            order.id(),
            order.order_number().to_string(),
            order.customer_id(),
            status,
            order.items().to_vec(),
            order.total_amount(),
            order.shipping_address().clone(),
            order.billing_address().clone(),
            order.created_at(),
            Utc::now(),
            order.version().next(),
        );

        *order = updated.clone();
        Ok(updated)
    }
}
