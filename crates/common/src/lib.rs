//! Shared types used across the order and loyalty crates.
//!
//! This crate provides the identifier newtypes, the `Money` value type and
//! the `Version` optimistic-concurrency token. It deliberately has no I/O
//! dependencies so every other crate can depend on it.

mod ids;
mod money;
mod version;

pub use ids::{CustomerId, OrderId, TransactionId};
pub use money::Money;
pub use version::Version;
