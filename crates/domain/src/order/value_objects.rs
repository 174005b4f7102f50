//! Value objects for the order domain.

use common::Money;
use serde::{Deserialize, Serialize};

use super::OrderError;

/// A line item in an order.
///
/// Items are immutable once the parent order leaves the pending-payment
/// state; the constructor is the only way to build one, which is what
/// enforces the `total_price = quantity * unit_price` invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// The product identifier.
    pub product_id: String,

    /// Optional product variant identifier.
    pub variant_id: Option<String>,

    /// Stock-keeping unit.
    pub sku: String,

    /// Human-readable product name.
    pub name: String,

    /// Quantity ordered (always at least 1).
    pub quantity: u32,

    /// Price per unit.
    pub unit_price: Money,

    /// Line total (quantity * unit_price).
    pub total_price: Money,
}

impl OrderItem {
    /// Creates a new order item, computing the line total.
    ///
    /// Fails with [`OrderError::InvalidQuantity`] for a zero quantity and
    /// [`OrderError::InvalidPrice`] for a negative unit price.
    pub fn new(
        product_id: impl Into<String>,
        variant_id: Option<String>,
        sku: impl Into<String>,
        name: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Result<Self, OrderError> {
        if quantity == 0 {
            return Err(OrderError::InvalidQuantity { quantity });
        }

        if unit_price.is_negative() {
            return Err(OrderError::InvalidPrice {
                price: unit_price.cents(),
            });
        }

        Ok(Self {
            product_id: product_id.into(),
            variant_id,
            sku: sku.into(),
            name: name.into(),
            quantity,
            total_price: unit_price.multiply(quantity),
            unit_price,
        })
    }
}

/// A postal address attached to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl Address {
    /// Creates a new address.
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        postal_code: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            city: city.into(),
            state: state.into(),
            postal_code: postal_code.into(),
            country: country.into(),
        }
    }
}
