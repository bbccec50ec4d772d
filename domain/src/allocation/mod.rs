//! Lead allocation domain.
//!
//! - [`request::PercentageAllocationRequest`]: transient (agent, percentage) input
//! - [`rounding::RoundingRule`]: how fractional shares become whole lead counts
//! - [`engine::AllocationEngine`]: shuffles a pool and partitions it by share
//! - [`entities::Allocation`]: the persisted link between a lead and an agent

pub mod engine;
pub mod entities;
pub mod request;
pub mod rounding;
