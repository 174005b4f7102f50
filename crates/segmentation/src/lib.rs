//! Derived customer segmentation.
//!
//! A segment is an ephemeral label computed from order-history aggregates
//! and account age. [`classify`] is a pure function — same inputs, same
//! segment, no I/O — which is what makes it unit-testable without a
//! database. [`customer_stats`] derives the inputs from an order store on
//! read paths; nothing here persists anything. Callers may cache a label as
//! a short-lived hint but never as ground truth.

mod segment;
mod stats;

pub use segment::{Segment, classify};
pub use stats::{CustomerStats, customer_stats, segment_customer};
