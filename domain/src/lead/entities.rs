//! Lead entity

use crate::core::ids::{AgentId, LeadId};
use serde::{Deserialize, Serialize};

/// An assignable unit of work, created by an external enrollment process.
///
/// `assigned_agent_id` is derived from the assignments table when leads are
/// loaded; it is never stored on the lead row itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    #[serde(default)]
    pub name: String,
    /// Category used only to pre-filter the pool
    #[serde(default)]
    pub course_id: Option<String>,
    /// Monetary value, carried through to reports and deals
    #[serde(default)]
    pub value: f64,
    /// Source consultation, copied onto deals created from this lead
    #[serde(default)]
    pub consultation_id: Option<String>,
    #[serde(default, skip_serializing)]
    pub assigned_agent_id: Option<AgentId>,
}

impl Lead {
    pub fn new(id: impl Into<LeadId>, value: f64) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            course_id: None,
            value,
            consultation_id: None,
            assigned_agent_id: None,
        }
    }

    pub fn with_course(mut self, course_id: impl Into<String>) -> Self {
        self.course_id = Some(course_id.into());
        self
    }

    pub fn with_assignee(mut self, agent_id: Option<AgentId>) -> Self {
        self.assigned_agent_id = agent_id;
        self
    }

    pub fn is_assigned(&self) -> bool {
        self.assigned_agent_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_assigned_follows_assignee() {
        let lead = Lead::new("L1", 10.0);
        assert!(!lead.is_assigned());
        assert!(lead.with_assignee(Some(AgentId::new(2))).is_assigned());
    }

    #[test]
    fn test_deserialize_minimal_row() {
        let lead: Lead = serde_json::from_str(r#"{"id": "L9"}"#).unwrap();
        assert_eq!(lead.id, LeadId::new("L9"));
        assert_eq!(lead.value, 0.0);
        assert!(lead.course_id.is_none());
    }

    #[test]
    fn test_assignee_not_serialized() {
        let lead = Lead::new("L1", 5.0).with_assignee(Some(AgentId::new(3)));
        let value = serde_json::to_value(&lead).unwrap();
        assert!(value.get("assigned_agent_id").is_none());
    }
}
