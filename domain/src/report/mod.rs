//! Assignment reporting.
//!
//! - [`aggregator::AssignmentReport`]: assignments grouped per agent with totals

pub mod aggregator;
