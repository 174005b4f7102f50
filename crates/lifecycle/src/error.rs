//! Lifecycle error types.

use domain::OrderError;
use ledger::LedgerError;
use order_store::OrderStoreError;
use thiserror::Error;

/// Errors that can occur during lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The transition was rejected by the state machine.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// An error occurred in the order store.
    #[error("Order store error: {0}")]
    Store(#[from] OrderStoreError),

    /// An error occurred in the loyalty ledger.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Convenience type alias for lifecycle results.
pub type Result<T> = std::result::Result<T, LifecycleError>;
