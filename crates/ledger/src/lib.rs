//! Append-only loyalty points ledger.
//!
//! The ledger is the only source of truth for a customer's point balance:
//! `balance == sum(points)` over all of that customer's transactions. A
//! cached balance column exists on the customer profile as a read
//! optimization, is updated atomically with every append, and is always
//! re-derivable; on any detected mismatch the ledger sum wins.
//!
//! Transactions are never updated or deleted after being appended.
//! Corrections are new entries with the offsetting sign that reference the
//! original, which is what keeps the ledger auditable.

mod error;
mod memory;
mod postgres;
mod service;
mod store;

pub use error::{LedgerError, Result};
pub use memory::InMemoryLedgerStore;
pub use postgres::PostgresLedgerStore;
pub use service::LoyaltyLedger;
pub use store::{CustomerProfile, LedgerStore};
