//! Order entity and related types.

mod entity;
mod status;
mod value_objects;

pub use entity::Order;
pub use status::OrderStatus;
pub use value_objects::{Address, OrderItem};

use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The requested status is not reachable from the current status.
    #[error("Invalid transition: cannot move from {current} to {requested}")]
    InvalidTransition {
        current: OrderStatus,
        requested: OrderStatus,
    },

    /// The order is in a terminal status and accepts no further transitions.
    #[error("Order is in terminal state {current}")]
    TerminalState { current: OrderStatus },

    /// A status value outside the known set reached the domain boundary.
    #[error("Unknown order status: {0:?}")]
    UnknownStatus(String),

    /// Item quantity must be at least 1.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// Item unit price must not be negative.
    #[error("Invalid unit price: {price} cents (must not be negative)")]
    InvalidPrice { price: i64 },

    /// Order total must not be negative.
    #[error("Invalid total amount: {total} cents (must not be negative)")]
    NegativeTotal { total: i64 },

    /// Items can only be modified while the order is pending payment.
    #[error("Items are locked once the order has reached {status}")]
    ItemsLocked { status: OrderStatus },

    /// An order cannot leave pending payment without items.
    #[error("Order has no items")]
    NoItems,
}
