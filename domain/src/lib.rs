//! Domain layer for leadflow
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Allocation
//!
//! A pool of unassigned leads is split between sales agents according to a
//! percentage request:
//!
//! - **Allocation Engine**: shuffles the pool and hands each agent its rounded
//!   share, giving any leftover leads to the first agent with a nonzero share
//! - **Allocation**: the persisted link between one lead and one agent
//!
//! ## Reporting
//!
//! - **Assignment Report**: assignments grouped per agent with count and value totals

pub mod agent;
pub mod allocation;
pub mod config;
pub mod core;
pub mod deal;
pub mod lead;
pub mod report;

// Re-export commonly used types
pub use agent::entities::Agent;
pub use allocation::{
    engine::{AllocationEngine, AllocationPlan, PlannedAssignment},
    entities::{Allocation, AllocationStatus, AllocationType},
    request::{AgentShare, PercentageAllocationRequest},
    rounding::RoundingRule,
};
pub use config::{
    OutputFormat,
    validation::{ConfigIssue, ConfigIssueCode, Severity},
};
pub use core::{
    error::DomainError,
    ids::{AgentId, LeadId},
};
pub use deal::entities::{Deal, PipelineStage, first_stage};
pub use lead::entities::Lead;
pub use report::aggregator::{AgentGroup, AssignmentReport};
