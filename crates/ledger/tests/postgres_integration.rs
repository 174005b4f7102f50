//! PostgreSQL integration tests for the loyalty ledger.
//!
//! These tests use a shared PostgreSQL container for efficiency. Run with:
//!
//! ```bash
//! cargo test -p ledger --test postgres_integration
//! ```

use std::sync::Arc;

use chrono::Utc;
use common::{CustomerId, OrderId};
use domain::{LoyaltyTransaction, TransactionSource};
use ledger::{LedgerError, LedgerStore, LoyaltyLedger, PostgresLedgerStore};
use serial_test::serial;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for migrations
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            sqlx::raw_sql(include_str!("../../../migrations/001_create_orders.sql"))
                .execute(&temp_pool)
                .await
                .unwrap();
            sqlx::raw_sql(include_str!("../../../migrations/002_create_loyalty.sql"))
                .execute(&temp_pool)
                .await
                .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresLedgerStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    // Row-level triggers do not fire on TRUNCATE
    sqlx::query("TRUNCATE TABLE loyalty_transactions, customers")
        .execute(&pool)
        .await
        .unwrap();

    PostgresLedgerStore::new(pool)
}

async fn registered_customer(store: &PostgresLedgerStore) -> CustomerId {
    let customer_id = CustomerId::new();
    store
        .register_customer(customer_id, Utc::now())
        .await
        .unwrap();
    customer_id
}

fn credit(customer_id: CustomerId, points: i64, concept: &str) -> LoyaltyTransaction {
    LoyaltyTransaction::new(
        customer_id,
        points,
        concept,
        TransactionSource::ManualAdjustment,
        Utc::now(),
    )
    .unwrap()
}

#[tokio::test]
#[serial]
async fn register_customer_is_idempotent() {
    let store = get_test_store().await;
    let customer_id = CustomerId::new();
    let created_at = Utc::now();

    store.register_customer(customer_id, created_at).await.unwrap();
    store.append(&credit(customer_id, 100, "Welcome bonus")).await.unwrap();

    // Re-registering neither fails nor resets the cached balance
    store.register_customer(customer_id, created_at).await.unwrap();

    let profile = store.get_customer(customer_id).await.unwrap().unwrap();
    assert_eq!(profile.points_balance, 100);
}

#[tokio::test]
#[serial]
async fn append_moves_cache_with_the_ledger() {
    let store = get_test_store().await;
    let customer_id = registered_customer(&store).await;

    store.append(&credit(customer_id, 100, "Welcome bonus")).await.unwrap();
    store.append(&credit(customer_id, -30, "Reward redemption")).await.unwrap();

    assert_eq!(store.sum_points(customer_id).await.unwrap(), 70);
    let profile = store.get_customer(customer_id).await.unwrap().unwrap();
    assert_eq!(profile.points_balance, 70);
}

#[tokio::test]
#[serial]
async fn append_for_unknown_customer_is_rejected() {
    let store = get_test_store().await;
    let err = store
        .append(&credit(CustomerId::new(), 100, "Welcome bonus"))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::CustomerNotFound(_)));
}

#[tokio::test]
#[serial]
async fn rows_cannot_be_updated_or_deleted() {
    let store = get_test_store().await;
    let customer_id = registered_customer(&store).await;

    let tx = credit(customer_id, 100, "Welcome bonus");
    store.append(&tx).await.unwrap();

    // The trigger rejects any rewrite attempt, even from raw SQL
    let update = sqlx::query("UPDATE loyalty_transactions SET points = 999 WHERE id = $1")
        .bind(tx.id.as_uuid())
        .execute(store.pool())
        .await;
    assert!(update.is_err());

    let delete = sqlx::query("DELETE FROM loyalty_transactions WHERE id = $1")
        .bind(tx.id.as_uuid())
        .execute(store.pool())
        .await;
    assert!(delete.is_err());

    assert_eq!(store.sum_points(customer_id).await.unwrap(), 100);
}

#[tokio::test]
#[serial]
async fn a_transaction_can_only_be_reversed_once() {
    let store = get_test_store().await;
    let customer_id = registered_customer(&store).await;

    let original = credit(customer_id, 100, "Welcome bonus");
    store.append(&original).await.unwrap();

    let reversal = LoyaltyTransaction::reversal_of(&original, Utc::now());
    store.append(&reversal).await.unwrap();

    // A second reversal hits the partial unique index
    let retry = LoyaltyTransaction::reversal_of(&original, Utc::now());
    let err = store.append(&retry).await.unwrap_err();
    assert!(matches!(err, LedgerError::AlreadyReversed { original: o } if o == original.id));

    // The failed insert left no trace in the cache either
    assert_eq!(store.sum_points(customer_id).await.unwrap(), 0);
    let profile = store.get_customer(customer_id).await.unwrap().unwrap();
    assert_eq!(profile.points_balance, 0);

    let found = store.find_reversal_of(original.id).await.unwrap().unwrap();
    assert_eq!(found.id, reversal.id);
}

#[tokio::test]
#[serial]
async fn an_order_can_only_accrue_once() {
    let store = get_test_store().await;
    let customer_id = registered_customer(&store).await;
    let order_id = OrderId::new();

    let accrual = LoyaltyTransaction::accrual(
        customer_id,
        order_id,
        120,
        "Points earned for order ORD-1001",
        Utc::now(),
    )
    .unwrap();
    store.append(&accrual).await.unwrap();

    let retry = LoyaltyTransaction::accrual(
        customer_id,
        order_id,
        120,
        "Points earned for order ORD-1001",
        Utc::now(),
    )
    .unwrap();
    let err = store.append(&retry).await.unwrap_err();
    assert!(matches!(err, LedgerError::DuplicateAccrual { order_id: o } if o == order_id));

    assert_eq!(store.sum_points(customer_id).await.unwrap(), 120);
}

#[tokio::test]
#[serial]
async fn reversing_an_accrual_does_not_block_its_order_tag() {
    let store = get_test_store().await;
    let customer_id = registered_customer(&store).await;
    let order_id = OrderId::new();

    let accrual = LoyaltyTransaction::accrual(
        customer_id,
        order_id,
        120,
        "Points earned for order ORD-1001",
        Utc::now(),
    )
    .unwrap();
    store.append(&accrual).await.unwrap();

    // The reversal keeps the order tag for auditing; the accrual guard only
    // watches non-reversal purchase rows, so this insert succeeds
    let reversal = LoyaltyTransaction::reversal_of(&accrual, Utc::now());
    store.append(&reversal).await.unwrap();

    // And the accrual lookup still resolves to the original, not the reversal
    let found = store.find_order_accrual(order_id).await.unwrap().unwrap();
    assert_eq!(found.id, accrual.id);

    assert_eq!(store.sum_points(customer_id).await.unwrap(), 0);
}

#[tokio::test]
#[serial]
async fn history_pages_newest_first() {
    let store = get_test_store().await;
    let customer_id = registered_customer(&store).await;

    let base = Utc::now();
    for (i, (points, concept)) in [(100, "First"), (-30, "Second"), (50, "Third")]
        .into_iter()
        .enumerate()
    {
        let mut tx = credit(customer_id, points, concept);
        tx.created_at = base + chrono::Duration::seconds(i as i64);
        store.append(&tx).await.unwrap();
    }

    let page = store.history(customer_id, 2, 0).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].concept, "Third");
    assert_eq!(page[1].concept, "Second");

    let rest = store.history(customer_id, 2, 2).await.unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].concept, "First");
}

#[tokio::test]
#[serial]
async fn reconcile_repairs_a_drifted_cache() {
    let store = get_test_store().await;
    let customer_id = registered_customer(&store).await;

    store.append(&credit(customer_id, 100, "Welcome bonus")).await.unwrap();

    // Drift the cache behind the ledger's back
    store.set_cached_balance(customer_id, 42).await.unwrap();

    let service = LoyaltyLedger::new(store);
    assert_eq!(service.cached_balance(customer_id).await.unwrap(), 42);

    // The ledger sum wins and the cache is repaired
    assert_eq!(service.reconcile_balance(customer_id).await.unwrap(), 100);
    assert_eq!(service.cached_balance(customer_id).await.unwrap(), 100);
}

#[tokio::test]
#[serial]
async fn service_accrual_is_idempotent_over_postgres() {
    let store = get_test_store().await;
    let customer_id = registered_customer(&store).await;
    let order_id = OrderId::new();

    let service = LoyaltyLedger::new(store);
    let first = service
        .append_accrual(customer_id, order_id, 120, "Points earned for order ORD-1001")
        .await
        .unwrap();
    let second = service
        .append_accrual(customer_id, order_id, 120, "Points earned for order ORD-1001")
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(service.get_balance(customer_id).await.unwrap(), 120);
}
