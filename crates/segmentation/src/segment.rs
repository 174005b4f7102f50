//! Segment labels and classification rules.

use common::Money;
use serde::{Deserialize, Serialize};

use crate::CustomerStats;

/// Lifetime value above which a customer is VIP (strictly greater).
const VIP_LIFETIME_VALUE: Money = Money::from_dollars(1000);

/// Thresholds for the LOYAL rule: account age and lifetime value.
const LOYAL_ANTIQUITY_DAYS: i64 = 180;
const LOYAL_LIFETIME_VALUE: Money = Money::from_dollars(500);

/// Thresholds for the RISK rule: old account, little spend.
const RISK_ANTIQUITY_DAYS: i64 = 90;
const RISK_LIFETIME_VALUE: Money = Money::from_dollars(100);

/// A derived customer classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    /// Recent or low-activity customer; the default bucket.
    New,

    /// Long-standing customer with solid spend.
    Loyal,

    /// Top spender.
    Vip,

    /// Long-standing account with almost no spend; churn risk.
    Risk,
}

impl Segment {
    /// Returns the segment label as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::New => "new",
            Segment::Loyal => "loyal",
            Segment::Vip => "vip",
            Segment::Risk => "risk",
        }
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classifies a customer from aggregate statistics.
///
/// Pure and deterministic: the rules are ordered and the first match wins.
/// All comparisons are strict, so a lifetime value of exactly $1000 is not
/// VIP.
pub fn classify(stats: &CustomerStats) -> Segment {
    if stats.lifetime_value > VIP_LIFETIME_VALUE {
        Segment::Vip
    } else if stats.antiquity_days > LOYAL_ANTIQUITY_DAYS
        && stats.lifetime_value > LOYAL_LIFETIME_VALUE
    {
        Segment::Loyal
    } else if stats.antiquity_days > RISK_ANTIQUITY_DAYS
        && stats.lifetime_value < RISK_LIFETIME_VALUE
    {
        Segment::Risk
    } else {
        Segment::New
    }
}
