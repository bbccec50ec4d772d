//! Allocation entity

use crate::core::ids::{AgentId, LeadId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How an allocation came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationType {
    /// Produced by a percentage distribution run
    Distributed,
    /// Explicitly chosen by an operator
    Manual,
    /// Moved in bulk from another agent
    Transferred,
}

impl AllocationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationType::Distributed => "distributed",
            AllocationType::Manual => "manual",
            AllocationType::Transferred => "transferred",
        }
    }
}

impl std::fmt::Display for AllocationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of an allocation.
///
/// Only an `Active` allocation holds its lead. A `Completed` one is kept as
/// history and the lead is free to be distributed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationStatus {
    #[default]
    Active,
    Completed,
}

impl AllocationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationStatus::Active => "active",
            AllocationStatus::Completed => "completed",
        }
    }
}

/// The persisted link between a lead and the agent currently responsible for it.
///
/// At most one allocation exists per lead. Replacing an allocation always
/// removes the previous one first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub lead_id: LeadId,
    pub agent_id: AgentId,
    pub assigned_by: String,
    pub assignment_type: AllocationType,
    #[serde(default)]
    pub status: AllocationStatus,
    pub assigned_at: DateTime<Utc>,
}

impl Allocation {
    pub fn new(
        lead_id: LeadId,
        agent_id: AgentId,
        assigned_by: impl Into<String>,
        assignment_type: AllocationType,
    ) -> Self {
        Self {
            lead_id,
            agent_id,
            assigned_by: assigned_by.into(),
            assignment_type,
            status: AllocationStatus::Active,
            assigned_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AllocationStatus::Active
    }
}
