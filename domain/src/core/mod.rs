//! Core domain concepts shared across all subdomains.
//!
//! - [`ids::LeadId`] / [`ids::AgentId`]: identifiers for leads and agents
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod ids;
