use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId, TransactionId};
use domain::{LoyaltyTransaction, TransactionSource};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{CustomerProfile, LedgerError, LedgerStore, Result};

const TX_COLUMNS: &str = "id, customer_id, points, concept, source, order_id, reverses, created_at";

/// PostgreSQL-backed ledger store implementation.
///
/// Append-only access is enforced by the schema itself: a trigger rejects
/// any UPDATE or DELETE on `loyalty_transactions`, and partial unique
/// indexes back the reversal and accrual idempotency guards.
#[derive(Clone)]
pub struct PostgresLedgerStore {
    pool: PgPool,
}

impl PostgresLedgerStore {
    /// Creates a new PostgreSQL ledger store.
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

    fn row_to_transaction(row: PgRow) -> Result<LoyaltyTransaction> {
        let source_text: String = row.try_get("source")?;
        let source: TransactionSource = source_text
            .parse()
            .map_err(|_| LedgerError::InvalidSource(source_text))?;

        Ok(LoyaltyTransaction {
            id: TransactionId::from_uuid(row.try_get::<Uuid, _>("id")?),
            customer_id: CustomerId::from_uuid(row.try_get::<Uuid, _>("customer_id")?),
            points: row.try_get("points")?,
            concept: row.try_get("concept")?,
            source,
            order_id: row
                .try_get::<Option<Uuid>, _>("order_id")?
                .map(OrderId::from_uuid),
            reverses: row
                .try_get::<Option<Uuid>, _>("reverses")?
                .map(TransactionId::from_uuid),
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    async fn register_customer(
        &self,
        customer_id: CustomerId,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO customers (id, created_at) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING",
        )
        .bind(customer_id.as_uuid())
        .bind(created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_customer(&self, customer_id: CustomerId) -> Result<Option<CustomerProfile>> {
        let row = sqlx::query("SELECT id, points_balance, created_at FROM customers WHERE id = $1")
            .bind(customer_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        Ok(match row {
            Some(row) => Some(CustomerProfile {
                customer_id: CustomerId::from_uuid(row.try_get::<Uuid, _>("id")?),
                points_balance: row.try_get("points_balance")?,
                created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            }),
            None => None,
        })
    }

    async fn append(&self, tx: &LoyaltyTransaction) -> Result<()> {
        // Insert and cache update commit together: the cached balance can
        // never drift from the ledger through this path.
        let mut db_tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO loyalty_transactions
                (id, customer_id, points, concept, source, order_id, reverses, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(tx.id.as_uuid())
        .bind(tx.customer_id.as_uuid())
        .bind(tx.points)
        .bind(&tx.concept)
        .bind(tx.source.as_str())
        .bind(tx.order_id.map(|id| id.as_uuid()))
        .bind(tx.reverses.map(|id| id.as_uuid()))
        .bind(tx.created_at)
        .execute(&mut *db_tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                match db_err.constraint() {
                    Some("loyalty_reversal_once") => {
                        if let Some(original) = tx.reverses {
                            return LedgerError::AlreadyReversed { original };
                        }
                    }
                    Some("loyalty_accrual_once") => {
                        if let Some(order_id) = tx.order_id {
                            return LedgerError::DuplicateAccrual { order_id };
                        }
                    }
                    Some("loyalty_transactions_customer_id_fkey") => {
                        return LedgerError::CustomerNotFound(tx.customer_id);
                    }
                    _ => {}
                }
            }
            LedgerError::Database(e)
        })?;

        let updated = sqlx::query("UPDATE customers SET points_balance = points_balance + $2 WHERE id = $1")
            .bind(tx.customer_id.as_uuid())
            .bind(tx.points)
            .execute(&mut *db_tx)
            .await?;

        if updated.rows_affected() == 0 {
            return Err(LedgerError::CustomerNotFound(tx.customer_id));
        }

        db_tx.commit().await?;
        Ok(())
    }

    async fn sum_points(&self, customer_id: CustomerId) -> Result<i64> {
        let sum: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(points), 0)::BIGINT FROM loyalty_transactions WHERE customer_id = $1",
        )
        .bind(customer_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;
        Ok(sum)
    }

    async fn history(
        &self,
        customer_id: CustomerId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LoyaltyTransaction>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {TX_COLUMNS} FROM loyalty_transactions
            WHERE customer_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(customer_id.as_uuid())
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_transaction).collect()
    }

    async fn get_transaction(&self, id: TransactionId) -> Result<Option<LoyaltyTransaction>> {
        let row = sqlx::query(&format!(
            "SELECT {TX_COLUMNS} FROM loyalty_transactions WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_transaction).transpose()
    }

    async fn find_reversal_of(
        &self,
        original: TransactionId,
    ) -> Result<Option<LoyaltyTransaction>> {
        let row = sqlx::query(&format!(
            "SELECT {TX_COLUMNS} FROM loyalty_transactions WHERE reverses = $1"
        ))
        .bind(original.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_transaction).transpose()
    }

    async fn find_order_accrual(&self, order_id: OrderId) -> Result<Option<LoyaltyTransaction>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {TX_COLUMNS} FROM loyalty_transactions
            WHERE order_id = $1 AND source = 'purchase' AND reverses IS NULL
            "#
        ))
        .bind(order_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_transaction).transpose()
    }

    async fn set_cached_balance(&self, customer_id: CustomerId, balance: i64) -> Result<()> {
        let updated = sqlx::query("UPDATE customers SET points_balance = $2 WHERE id = $1")
            .bind(customer_id.as_uuid())
            .bind(balance)
            .execute(&self.pool)
            .await?;

        if updated.rows_affected() == 0 {
            return Err(LedgerError::CustomerNotFound(customer_id));
        }
        Ok(())
    }
}
