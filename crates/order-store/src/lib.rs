//! Durable order storage.
//!
//! The [`OrderStore`] trait is the persistence boundary for orders. Status
//! writes go through a version compare-and-set so that two concurrent
//! transitions on the same order cannot both succeed against a stale
//! snapshot. Two implementations are provided: an in-memory store for tests
//! and a PostgreSQL store for production.

mod config;
mod error;
mod memory;
mod postgres;
mod store;

pub use config::DatabaseConfig;
pub use error::{OrderStoreError, Result};
pub use memory::InMemoryOrderStore;
pub use postgres::PostgresOrderStore;
pub use store::OrderStore;
