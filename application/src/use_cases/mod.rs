//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod assign_leads;
pub mod build_report;
pub mod distribute_leads;
pub mod find_orphans;
pub mod project_deals;
pub(crate) mod shared;
pub mod transfer_leads;
pub mod unassign_leads;
