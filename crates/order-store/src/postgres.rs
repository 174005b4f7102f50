use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CustomerId, Money, OrderId, Version};
use domain::{Address, Order, OrderItem, OrderStatus};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{OrderStore, OrderStoreError, Result};

const ORDER_COLUMNS: &str = "id, order_number, customer_id, status, items, total_amount, \
     shipping_address, billing_address, version, created_at, updated_at";

/// PostgreSQL-backed order store implementation.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let status_text: String = row.try_get("status")?;
        let status: OrderStatus = status_text
            .parse()
            .map_err(|_| OrderStoreError::InvalidStatus(status_text))?;

        let items_json: serde_json::Value = row.try_get("items")?;
        let items: Vec<OrderItem> = serde_json::from_value(items_json)?;

        let shipping_json: serde_json::Value = row.try_get("shipping_address")?;
        let shipping_address: Address = serde_json::from_value(shipping_json)?;

        let billing_json: serde_json::Value = row.try_get("billing_address")?;
        let billing_address: Address = serde_json::from_value(billing_json)?;

        Ok(Order::from_storage(
            OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            row.try_get("order_number")?,
            CustomerId::from_uuid(row.try_get::<Uuid, _>("customer_id")?),
            status,
            items,
            Money::from_cents(row.try_get("total_amount")?),
            shipping_address,
            billing_address,
            row.try_get::<DateTime<Utc>, _>("created_at")?,
            row.try_get::<DateTime<Utc>, _>("updated_at")?,
            Version::new(row.try_get("version")?),
        ))
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn insert(&self, order: &Order) -> Result<()> {
        let items_json = serde_json::to_value(order.items())?;
        let shipping_json = serde_json::to_value(order.shipping_address())?;
        let billing_json = serde_json::to_value(order.billing_address())?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, order_number, customer_id, status, items, total_amount,
                                shipping_address, billing_address, version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(order.id().as_uuid())
        .bind(order.order_number())
        .bind(order.customer_id().as_uuid())
        .bind(order.status().as_str())
        .bind(items_json)
        .bind(order.total_amount().cents())
        .bind(shipping_json)
        .bind(billing_json)
        .bind(order.version().as_i64())
        .bind(order.created_at())
        .bind(order.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                match db_err.constraint() {
                    Some("orders_pkey") => {
                        return OrderStoreError::OrderAlreadyExists(order.id());
                    }
                    Some("orders_order_number_key") => {
                        return OrderStoreError::DuplicateOrderNumber(
                            order.order_number().to_string(),
                        );
                    }
                    _ => {}
                }
            }
            OrderStoreError::Database(e)
        })?;

        Ok(())
    }

    async fn get(&self, order_id: OrderId) -> Result<Order> {
        let row = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(order_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(OrderStoreError::OrderNotFound(order_id))?;

        Self::row_to_order(row)
    }

    async fn get_by_number(&self, order_number: &str) -> Result<Order> {
        let row = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_number = $1"
        ))
        .bind(order_number)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| OrderStoreError::OrderNumberNotFound(order_number.to_string()))?;

        Self::row_to_order(row)
    }

    async fn list_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE customer_id = $1 ORDER BY created_at ASC"
        ))
        .bind(customer_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
        expected_version: Version,
    ) -> Result<Order> {
        // Single-statement compare-and-set: the version predicate and the
        // write are atomic, so a racing transition cannot interleave.
        let row = sqlx::query(&format!(
            r#"
            UPDATE orders
            SET status = $3, version = version + 1, updated_at = NOW()
            WHERE id = $1 AND version = $2
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(order_id.as_uuid())
        .bind(expected_version.as_i64())
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::row_to_order(row),
            None => {
                // Distinguish a lost race from a missing order.
                let actual: Option<i64> =
                    sqlx::query_scalar("SELECT version FROM orders WHERE id = $1")
                        .bind(order_id.as_uuid())
                        .fetch_optional(&self.pool)
                        .await?;

                match actual {
                    Some(actual) => Err(OrderStoreError::ConcurrencyConflict {
                        order_id,
                        expected: expected_version,
                        actual: Version::new(actual),
                    }),
                    None => Err(OrderStoreError::OrderNotFound(order_id)),
                }
            }
        }
    }
}
