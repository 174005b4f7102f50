//! Pure domain model for the commercial core.
//!
//! This crate contains the order lifecycle state machine, the order entity
//! with its value objects, and the loyalty transaction types. Everything
//! here is synchronous and side-effect free; persistence and orchestration
//! live in the store and lifecycle crates.

pub mod loyalty;
pub mod order;

pub use loyalty::{LoyaltyError, LoyaltyTransaction, TransactionSource};
pub use order::{Address, Order, OrderError, OrderItem, OrderStatus};
