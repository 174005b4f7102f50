//! Order entity.

use chrono::{DateTime, Utc};
use common::{CustomerId, Money, OrderId, Version};
use serde::{Deserialize, Serialize};

use super::{Address, OrderError, OrderItem, OrderStatus};

/// An order with its line items and lifecycle status.
///
/// All status changes go through [`Order::transition`], which validates
/// against the state machine before applying anything. The `version` field
/// is the optimistic-concurrency token: stores bump it on every successful
/// write and reject writes whose expected version no longer matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    order_number: String,
    customer_id: CustomerId,
    status: OrderStatus,
    items: Vec<OrderItem>,
    total_amount: Money,
    shipping_address: Address,
    billing_address: Address,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: Version,
}

impl Order {
    /// Creates a new order in `PendingPayment`.
    ///
    /// The caller supplies the total; the core never recomputes it, since
    /// shipping, tax and discounts are tracked outside this crate. A
    /// negative total is rejected.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: OrderId,
        order_number: impl Into<String>,
        customer_id: CustomerId,
        items: Vec<OrderItem>,
        total_amount: Money,
        shipping_address: Address,
        billing_address: Address,
        now: DateTime<Utc>,
    ) -> Result<Self, OrderError> {
        if total_amount.is_negative() {
            return Err(OrderError::NegativeTotal {
                total: total_amount.cents(),
            });
        }

        Ok(Self {
            id,
            order_number: order_number.into(),
            customer_id,
            status: OrderStatus::PendingPayment,
            items,
            total_amount,
            shipping_address,
            billing_address,
            created_at: now,
            updated_at: now,
            version: Version::first(),
        })
    }

    /// Rehydrates an order from storage.
    ///
    /// Intended for store implementations only; no state-machine validation
    /// is applied because the fields were validated when first written.
    #[allow(clippy::too_many_arguments)]
    pub fn from_storage(
        id: OrderId,
        order_number: String,
        customer_id: CustomerId,
        status: OrderStatus,
        items: Vec<OrderItem>,
        total_amount: Money,
        shipping_address: Address,
        billing_address: Address,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        version: Version,
    ) -> Self {
        Self {
            id,
            order_number,
            customer_id,
            status,
            items,
            total_amount,
            shipping_address,
            billing_address,
            created_at,
            updated_at,
            version,
        }
    }

    /// Returns the order identifier.
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Returns the human-readable order number.
    pub fn order_number(&self) -> &str {
        &self.order_number
    }

    /// Returns the customer who placed the order.
    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    /// Returns the current status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Returns the line items.
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Returns the order total.
    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    /// Returns the shipping address.
    pub fn shipping_address(&self) -> &Address {
        &self.shipping_address
    }

    /// Returns the billing address.
    pub fn billing_address(&self) -> &Address {
        &self.billing_address
    }

    /// Returns the creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last-modified timestamp.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the optimistic-concurrency token.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Sets the version. Store implementations call this after a write.
    pub fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    /// Returns true if the order is in a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Checks whether a transition to `target` would be legal, without
    /// applying it.
    ///
    /// Performs zero side effects; this is the check the lifecycle service
    /// runs before any persistence write.
    pub fn validate_transition(&self, target: OrderStatus) -> Result<(), OrderError> {
        if self.status.is_terminal() {
            return Err(OrderError::TerminalState {
                current: self.status,
            });
        }

        if !self.status.can_transition_to(target) {
            return Err(OrderError::InvalidTransition {
                current: self.status,
                requested: target,
            });
        }

        // An order cannot be paid for while empty
        if self.status == OrderStatus::PendingPayment
            && target == OrderStatus::Paid
            && self.items.is_empty()
        {
            return Err(OrderError::NoItems);
        }

        Ok(())
    }

    /// Validates and applies a transition, bumping `updated_at`.
    pub fn transition(
        &mut self,
        target: OrderStatus,
        now: DateTime<Utc>,
    ) -> Result<(), OrderError> {
        self.validate_transition(target)?;
        self.status = target;
        self.updated_at = now;
        Ok(())
    }

    /// Adds a line item. Only legal while the order is pending payment.
    pub fn add_item(&mut self, item: OrderItem, now: DateTime<Utc>) -> Result<(), OrderError> {
        if !self.status.items_mutable() {
            return Err(OrderError::ItemsLocked {
                status: self.status,
            });
        }

        self.items.push(item);
        self.updated_at = now;
        Ok(())
    }

    /// Replaces the caller-supplied total. Only legal while pending payment.
    pub fn set_total_amount(
        &mut self,
        total_amount: Money,
        now: DateTime<Utc>,
    ) -> Result<(), OrderError> {
        if !self.status.items_mutable() {
            return Err(OrderError::ItemsLocked {
                status: self.status,
            });
        }

        if total_amount.is_negative() {
            return Err(OrderError::NegativeTotal {
                total: total_amount.cents(),
            });
        }

        self.total_amount = total_amount;
        self.updated_at = now;
        Ok(())
    }
}
