//! Order lifecycle orchestration.
//!
//! [`OrderLifecycle`] drives every status change: it validates the requested
//! transition against the state machine, writes the new status through the
//! order store's version compare-and-set, and applies the loyalty side
//! effects — one accrual when an order first reaches `Delivered`, one
//! compensating reversal when a post-payment order is cancelled or returned
//! after an accrual was posted. External code calls this service; it never
//! writes `status` or inserts ledger rows directly.

mod error;
mod policy;
mod service;

pub use error::{LifecycleError, Result};
pub use policy::{AccrualPolicy, PercentageAccrual};
pub use service::OrderLifecycle;
