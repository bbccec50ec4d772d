//! Domain error types

use crate::core::ids::{AgentId, LeadId};
use thiserror::Error;

/// Domain-level errors
///
/// Every variant except [`DomainError::RemainderUnassigned`] is a validation
/// failure detected before any store mutation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Percentages must sum to exactly 100 (got {0})")]
    InvalidPercentageTotal(u32),

    #[error("No agents selected")]
    NoAgents,

    #[error("No leads selected")]
    NoLeads,

    #[error("Agent {0} appears more than once in the request")]
    DuplicateAgent(AgentId),

    #[error("Agent {0} not found")]
    UnknownAgent(AgentId),

    #[error("Agent {0} is inactive")]
    InactiveAgent(AgentId),

    #[error("Lead {0} not found")]
    UnknownLead(LeadId),

    #[error("{0} leads left over with no agent to receive them")]
    RemainderUnassigned(usize),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl DomainError {
    /// Check if this error was raised while validating input
    pub fn is_validation(&self) -> bool {
        !matches!(self, DomainError::RemainderUnassigned(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_error_display() {
        let error = DomainError::InvalidPercentageTotal(99);
        assert_eq!(
            error.to_string(),
            "Percentages must sum to exactly 100 (got 99)"
        );
    }

    #[test]
    fn test_is_validation_check() {
        assert!(DomainError::NoAgents.is_validation());
        assert!(DomainError::InactiveAgent(AgentId::new(3)).is_validation());
        assert!(!DomainError::RemainderUnassigned(2).is_validation());
    }
}
