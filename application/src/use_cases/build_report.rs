//! Build Report use case
//!
//! Groups every current assignment in the store per agent.

use crate::config::TableNames;
use crate::ports::record_store::{Filter, RecordStore, StoreError};
use crate::use_cases::shared::{lead_id_values, load_agents, load_assignments, load_leads};
use leadflow_domain::{AgentId, AssignmentReport};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while building a report
#[derive(Error, Debug)]
pub enum BuildReportError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Use case for reporting current assignments
pub struct BuildReportUseCase<S: RecordStore + 'static> {
    store: Arc<S>,
    tables: TableNames,
}

impl<S: RecordStore + 'static> BuildReportUseCase<S> {
    pub fn new(store: Arc<S>, tables: TableNames) -> Self {
        Self { store, tables }
    }

    /// Report on all assignments, or only those of `agent`
    pub async fn execute(&self, agent: Option<AgentId>) -> Result<AssignmentReport, BuildReportError> {
        let filter = match agent {
            Some(id) => Filter::new().eq("agent_id", id.value()),
            None => Filter::new(),
        };
        let assignments = load_assignments(self.store.as_ref(), &self.tables, &filter).await?;
        if assignments.is_empty() {
            return Ok(AssignmentReport::default());
        }

        let agents = load_agents(self.store.as_ref(), &self.tables).await?;
        let leads = load_leads(
            self.store.as_ref(),
            &self.tables,
            &Filter::new().in_list("id", lead_id_values(assignments.iter().map(|a| &a.lead_id))),
        )
        .await?;

        Ok(AssignmentReport::build(
            assignments.iter().map(|a| (&a.lead_id, a.agent_id)),
            &leads,
            &agents,
        ))
    }
}
