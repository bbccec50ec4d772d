//! Report Aggregator
//!
//! Pure grouping of (lead, agent) pairs for confirmation display.

use crate::agent::entities::Agent;
use crate::core::ids::{AgentId, LeadId};
use crate::lead::entities::Lead;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Leads held by one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentGroup {
    pub agent_id: AgentId,
    pub agent_name: String,
    pub lead_ids: Vec<LeadId>,
    pub count: usize,
    pub total_value: f64,
}

/// Assignments grouped by agent, ordered by agent id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentReport {
    pub groups: Vec<AgentGroup>,
    pub total_count: usize,
    pub total_value: f64,
}

impl AssignmentReport {
    /// Group `pairs` by agent.
    ///
    /// Lead values come from `leads`; a lead missing there counts with value 0.
    /// Agents missing from `agents` are labelled `Agent #<id>`.
    pub fn build<'a, I>(pairs: I, leads: &[Lead], agents: &[Agent]) -> Self
    where
        I: IntoIterator<Item = (&'a LeadId, AgentId)>,
    {
        let values: HashMap<&LeadId, f64> = leads.iter().map(|l| (&l.id, l.value)).collect();
        let names: HashMap<AgentId, &str> =
            agents.iter().map(|a| (a.id, a.name.as_str())).collect();

        let mut grouped: BTreeMap<AgentId, AgentGroup> = BTreeMap::new();
        for (lead_id, agent_id) in pairs {
            let group = grouped.entry(agent_id).or_insert_with(|| AgentGroup {
                agent_id,
                agent_name: names
                    .get(&agent_id)
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| format!("Agent #{}", agent_id)),
                lead_ids: Vec::new(),
                count: 0,
                total_value: 0.0,
            });
            group.lead_ids.push(lead_id.clone());
            group.count += 1;
            group.total_value += values.get(lead_id).copied().unwrap_or(0.0);
        }

        let groups: Vec<AgentGroup> = grouped.into_values().collect();
        let total_count = groups.iter().map(|g| g.count).sum();
        let total_value = groups.iter().map(|g| g.total_value).sum();

        Self {
            groups,
            total_count,
            total_value,
        }
    }

    pub fn group(&self, agent_id: AgentId) -> Option<&AgentGroup> {
        self.groups.iter().find(|g| g.agent_id == agent_id)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
