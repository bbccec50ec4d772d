//! Find Orphans use case
//!
//! Reports leads whose assigned agent is inactive or no longer exists.
//! Nothing is corrected automatically; the operator resolves each group
//! with a transfer.

use crate::config::TableNames;
use crate::ports::record_store::{Filter, RecordStore, StoreError};
use crate::use_cases::shared::{load_agents, load_assignments};
use leadflow_domain::{AgentId, LeadId};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Leads stranded with one unavailable agent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrphanGroup {
    pub agent_id: AgentId,
    /// `None` when the agent row is gone entirely
    pub agent_name: Option<String>,
    pub lead_ids: Vec<LeadId>,
}

/// Use case for detecting orphaned leads
pub struct FindOrphansUseCase<S: RecordStore + 'static> {
    store: Arc<S>,
    tables: TableNames,
}

impl<S: RecordStore + 'static> FindOrphansUseCase<S> {
    pub fn new(store: Arc<S>, tables: TableNames) -> Self {
        Self { store, tables }
    }

    /// Orphaned leads grouped by agent, ordered by agent id
    pub async fn execute(&self) -> Result<Vec<OrphanGroup>, StoreError> {
        let agents = load_agents(self.store.as_ref(), &self.tables).await?;
        let assignments =
            load_assignments(self.store.as_ref(), &self.tables, &Filter::new()).await?;

        let status: HashMap<AgentId, (&str, bool)> = agents
            .iter()
            .map(|a| (a.id, (a.name.as_str(), a.is_active)))
            .collect();

        let mut groups: BTreeMap<AgentId, OrphanGroup> = BTreeMap::new();
        for assignment in assignments {
            let known = status.get(&assignment.agent_id);
            if matches!(known, Some((_, true))) {
                continue;
            }
            groups
                .entry(assignment.agent_id)
                .or_insert_with(|| OrphanGroup {
                    agent_id: assignment.agent_id,
                    agent_name: known.map(|(name, _)| name.to_string()),
                    lead_ids: Vec::new(),
                })
                .lead_ids
                .push(assignment.lead_id);
        }

        debug!("{} agents hold orphaned leads", groups.len());
        Ok(groups.into_values().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assignment_row, seeded_store};

    #[tokio::test]
    async fn test_groups_leads_of_inactive_and_missing_agents() {
        let tables = TableNames::default();
        let store = Arc::new(seeded_store(&tables).with_rows(
            &tables.assignments,
            vec![
                assignment_row("L1", 1),
                assignment_row("L2", 3),
                assignment_row("L3", 42),
                assignment_row("L4", 3),
            ],
        ));

        let orphans = FindOrphansUseCase::new(store, tables).execute().await.unwrap();

        assert_eq!(orphans.len(), 2);
        assert_eq!(orphans[0].agent_id, AgentId::new(3));
        assert_eq!(orphans[0].agent_name.as_deref(), Some("Cal"));
        assert_eq!(orphans[0].lead_ids, vec![LeadId::new("L2"), LeadId::new("L4")]);
        assert_eq!(orphans[1].agent_id, AgentId::new(42));
        assert_eq!(orphans[1].agent_name, None);
    }

    #[tokio::test]
    async fn test_no_orphans() {
        let tables = TableNames::default();
        let store = Arc::new(
            seeded_store(&tables).with_rows(&tables.assignments, vec![assignment_row("L1", 2)]),
        );

        let orphans = FindOrphansUseCase::new(store, tables).execute().await.unwrap();
        assert!(orphans.is_empty());
    }
}
