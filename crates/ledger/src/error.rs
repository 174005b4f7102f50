use common::{CustomerId, OrderId, TransactionId};
use domain::LoyaltyError;
use thiserror::Error;

/// Errors that can occur when interacting with the loyalty ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed input (zero points, empty concept). The caller must fix
    /// the input and retry.
    #[error("Validation error: {0}")]
    Validation(#[from] LoyaltyError),

    /// The referenced customer does not exist.
    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    /// The referenced transaction does not exist.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// A reversal referencing this original has already been appended.
    /// Retried reversal requests are expected; callers treat this as
    /// idempotent success.
    #[error("Transaction {original} has already been reversed")]
    AlreadyReversed { original: TransactionId },

    /// An accrual for this order has already been appended.
    #[error("Order {order_id} already has an accrual")]
    DuplicateAccrual { order_id: OrderId },

    /// A stored source value is outside the known set.
    #[error("Invalid stored source: {0:?}")]
    InvalidSource(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
