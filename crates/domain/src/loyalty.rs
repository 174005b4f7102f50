//! Loyalty transaction types.
//!
//! A loyalty transaction is a signed point delta in an append-only ledger.
//! Transactions are never mutated or deleted after creation; corrections are
//! made by appending an offsetting entry that references the original.

use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId, TransactionId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for loyalty transactions.
#[derive(Debug, Error)]
pub enum LoyaltyError {
    /// A transaction must move a non-zero number of points.
    #[error("Transaction points must be non-zero")]
    ZeroPoints,

    /// Every transaction needs a human-readable reason.
    #[error("Transaction concept must not be empty")]
    EmptyConcept,

    /// A source value outside the known set reached the domain boundary.
    #[error("Unknown transaction source: {0:?}")]
    UnknownSource(String),
}

/// Where a loyalty transaction originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionSource {
    /// An operator adjusted the balance by hand.
    ManualAdjustment,

    /// Points accrued from a delivered order.
    Purchase,

    /// Points spent on a reward.
    RewardRedemption,

    /// Birthday gift points.
    BirthdayBonus,

    /// Anything else.
    Other,
}

impl TransactionSource {
    /// Returns the wire/column representation of the source.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionSource::ManualAdjustment => "manual_adjustment",
            TransactionSource::Purchase => "purchase",
            TransactionSource::RewardRedemption => "reward_redemption",
            TransactionSource::BirthdayBonus => "birthday_bonus",
            TransactionSource::Other => "other",
        }
    }
}

impl std::fmt::Display for TransactionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TransactionSource {
    type Err = LoyaltyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual_adjustment" => Ok(TransactionSource::ManualAdjustment),
            "purchase" => Ok(TransactionSource::Purchase),
            "reward_redemption" => Ok(TransactionSource::RewardRedemption),
            "birthday_bonus" => Ok(TransactionSource::BirthdayBonus),
            "other" => Ok(TransactionSource::Other),
            other => Err(LoyaltyError::UnknownSource(other.to_string())),
        }
    }
}

/// A signed point delta in a customer's loyalty ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyTransaction {
    /// Unique transaction identifier.
    pub id: TransactionId,

    /// The customer whose balance this entry moves.
    pub customer_id: CustomerId,

    /// Signed point delta; positive = credit, negative = debit.
    pub points: i64,

    /// Human-readable reason for the entry.
    pub concept: String,

    /// Where the entry originated.
    pub source: TransactionSource,

    /// Set on order-driven accruals (and carried onto their reversals) so an
    /// order's accrual can be matched and reversed exactly once.
    pub order_id: Option<OrderId>,

    /// Set on reversals, referencing the transaction being negated.
    pub reverses: Option<TransactionId>,

    /// Creation timestamp; immutable, like everything else here.
    pub created_at: DateTime<Utc>,
}

impl LoyaltyTransaction {
    /// Creates a new transaction after validating the delta and concept.
    pub fn new(
        customer_id: CustomerId,
        points: i64,
        concept: impl Into<String>,
        source: TransactionSource,
        now: DateTime<Utc>,
    ) -> Result<Self, LoyaltyError> {
        let concept = concept.into();

        if points == 0 {
            return Err(LoyaltyError::ZeroPoints);
        }

        if concept.trim().is_empty() {
            return Err(LoyaltyError::EmptyConcept);
        }

        Ok(Self {
            id: TransactionId::new(),
            customer_id,
            points,
            concept,
            source,
            order_id: None,
            reverses: None,
            created_at: now,
        })
    }

    /// Creates an order-tagged accrual (a purchase credit).
    pub fn accrual(
        customer_id: CustomerId,
        order_id: OrderId,
        points: i64,
        concept: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, LoyaltyError> {
        let mut tx = Self::new(customer_id, points, concept, TransactionSource::Purchase, now)?;
        tx.order_id = Some(order_id);
        Ok(tx)
    }

    /// Creates the reversal of an existing transaction.
    ///
    /// The reversal negates the original's points, keeps its source and
    /// order tag for auditing, and references the original's id. The
    /// original is always a valid transaction, so this cannot fail
    /// validation.
    pub fn reversal_of(original: &LoyaltyTransaction, now: DateTime<Utc>) -> Self {
        Self {
            id: TransactionId::new(),
            customer_id: original.customer_id,
            points: -original.points,
            concept: format!("Reversal of {}: {}", original.id, original.concept),
            source: original.source,
            order_id: original.order_id,
            reverses: Some(original.id),
            created_at: now,
        }
    }

    /// Returns true if this entry reverses another one.
    pub fn is_reversal(&self) -> bool {
        self.reverses.is_some()
    }
}
