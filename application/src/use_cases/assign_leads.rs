//! Assign Leads use case
//!
//! Manual, single-agent assignment of explicitly selected leads. Unlike a
//! distribution run this does not look at current assignment status: leads
//! already held by another agent are reassigned. The previous allocations are
//! removed and the new ones inserted in the same batch.

use crate::config::TableNames;
use crate::ports::audit_log::{AuditEvent, AuditLog, NoAuditLog};
use crate::ports::record_store::{Filter, RecordStore, StoreError, WriteOp};
use crate::use_cases::project_deals::{self, DealOptions, DealProjection, ProjectDealsError};
use crate::use_cases::shared::{
    dedup_ids, lead_id_values, load_agents, load_leads, require_active, to_row,
};
use leadflow_domain::{
    AgentId, Allocation, AllocationType, AssignmentReport, DomainError, LeadId,
};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur during manual assignment
#[derive(Error, Debug)]
pub enum AssignLeadsError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("{assigned} leads assigned, but deal creation failed: {source}")]
    PartialFailure {
        assigned: usize,
        #[source]
        source: ProjectDealsError,
    },
}

/// Input for the AssignLeads use case
#[derive(Debug, Clone)]
pub struct AssignLeadsInput {
    pub agent_id: AgentId,
    pub lead_ids: Vec<LeadId>,
    pub assigned_by: String,
    pub deals: Option<DealOptions>,
}

impl AssignLeadsInput {
    pub fn new(
        agent_id: impl Into<AgentId>,
        lead_ids: Vec<LeadId>,
        assigned_by: impl Into<String>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            lead_ids,
            assigned_by: assigned_by.into(),
            deals: None,
        }
    }

    pub fn with_deals(mut self, options: DealOptions) -> Self {
        self.deals = Some(options);
        self
    }
}

/// Output of a manual assignment
#[derive(Debug, Clone)]
pub struct AssignLeadsOutput {
    /// Leads that were held by a different agent before
    pub reassigned: Vec<LeadId>,
    pub report: AssignmentReport,
    pub deals: Option<DealProjection>,
}

/// Use case for assigning selected leads to one agent
pub struct AssignLeadsUseCase<S: RecordStore + 'static> {
    store: Arc<S>,
    tables: TableNames,
    audit: Arc<dyn AuditLog>,
}

impl<S: RecordStore + 'static> AssignLeadsUseCase<S> {
    pub fn new(store: Arc<S>, tables: TableNames) -> Self {
        Self {
            store,
            tables,
            audit: Arc::new(NoAuditLog),
        }
    }

    pub fn with_audit_log(mut self, audit: Arc<dyn AuditLog>) -> Self {
        self.audit = audit;
        self
    }

    pub async fn execute(
        &self,
        input: AssignLeadsInput,
    ) -> Result<AssignLeadsOutput, AssignLeadsError> {
        let lead_ids = dedup_ids(&input.lead_ids);
        if lead_ids.is_empty() {
            return Err(DomainError::NoLeads.into());
        }

        let agents = load_agents(self.store.as_ref(), &self.tables).await?;
        require_active(&agents, input.agent_id)?;

        let leads = load_leads(
            self.store.as_ref(),
            &self.tables,
            &Filter::new().in_list("id", lead_id_values(&lead_ids)),
        )
        .await?;
        let found: HashSet<&LeadId> = leads.iter().map(|l| &l.id).collect();
        if let Some(missing) = lead_ids.iter().find(|id| !found.contains(id)) {
            return Err(DomainError::UnknownLead(missing.clone()).into());
        }

        let reassigned: Vec<LeadId> = leads
            .iter()
            .filter(|l| l.assigned_agent_id.is_some_and(|a| a != input.agent_id))
            .map(|l| l.id.clone())
            .collect();

        let rows = lead_ids
            .iter()
            .map(|id| {
                let allocation = Allocation::new(
                    id.clone(),
                    input.agent_id,
                    input.assigned_by.clone(),
                    AllocationType::Manual,
                );
                to_row(&self.tables.assignments, &allocation)
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.store
            .batch(vec![
                WriteOp::Delete {
                    table: self.tables.assignments.clone(),
                    filter: Filter::new().in_list("lead_id", lead_id_values(&lead_ids)),
                },
                WriteOp::Insert {
                    table: self.tables.assignments.clone(),
                    rows,
                },
            ])
            .await?;

        info!(
            agent = %input.agent_id,
            assigned = lead_ids.len(),
            reassigned = reassigned.len(),
            "Leads assigned manually"
        );

        let pairs: Vec<(LeadId, AgentId)> = lead_ids
            .iter()
            .map(|id| (id.clone(), input.agent_id))
            .collect();

        let deals = match &input.deals {
            Some(options) => match project_deals::project(
                self.store.as_ref(),
                &self.tables,
                &pairs,
                &leads,
                &options.pipeline_id,
            )
            .await
            {
                Ok(projection) => Some(projection),
                Err(source) => {
                    warn!("Deal creation failed after assignment: {}", source);
                    self.record(&input, &lead_ids, &reassigned, None);
                    return Err(AssignLeadsError::PartialFailure {
                        assigned: lead_ids.len(),
                        source,
                    });
                }
            },
            None => None,
        };

        self.record(&input, &lead_ids, &reassigned, deals.as_ref());

        let report = AssignmentReport::build(pairs.iter().map(|(l, a)| (l, *a)), &leads, &agents);

        Ok(AssignLeadsOutput {
            reassigned,
            report,
            deals,
        })
    }

    fn record(
        &self,
        input: &AssignLeadsInput,
        lead_ids: &[LeadId],
        reassigned: &[LeadId],
        deals: Option<&DealProjection>,
    ) {
        self.audit.record(AuditEvent::new(
            "leads_assigned",
            serde_json::json!({
                "agent_id": input.agent_id,
                "assigned_by": input.assigned_by,
                "lead_ids": lead_ids,
                "reassigned": reassigned,
                "deals_created": deals.map(|d| d.created.len()),
            }),
        ));
    }
}
