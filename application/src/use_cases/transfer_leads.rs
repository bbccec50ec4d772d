//! Transfer Leads use case
//!
//! Bulk reassignment of every lead held by one agent to another. This is the
//! operator's tool for resolving orphaned leads left behind by a deactivated
//! agent (see [`FindOrphansUseCase`](super::find_orphans::FindOrphansUseCase)).

use crate::config::TableNames;
use crate::ports::audit_log::{AuditEvent, AuditLog, NoAuditLog};
use crate::ports::record_store::{Filter, RecordStore, Row, StoreError, WriteOp};
use crate::use_cases::shared::{lead_id_values, load_agents, load_assignments, require_active};
use chrono::Utc;
use leadflow_domain::{AgentId, AllocationType, DomainError, LeadId};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur during a transfer
#[derive(Error, Debug)]
pub enum TransferLeadsError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Input for the TransferLeads use case
#[derive(Debug, Clone)]
pub struct TransferLeadsInput {
    pub from: AgentId,
    pub to: AgentId,
    pub assigned_by: String,
}

/// Output of a transfer
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransferLeadsOutput {
    pub moved: Vec<LeadId>,
}

/// Use case for moving all of one agent's leads to another agent
pub struct TransferLeadsUseCase<S: RecordStore + 'static> {
    store: Arc<S>,
    tables: TableNames,
    audit: Arc<dyn AuditLog>,
}

impl<S: RecordStore + 'static> TransferLeadsUseCase<S> {
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
        input: TransferLeadsInput,
    ) -> Result<TransferLeadsOutput, TransferLeadsError> {
        if input.from == input.to {
            return Err(DomainError::InvalidRequest(format!(
                "cannot transfer leads from agent {} to itself",
                input.from
            ))
            .into());
        }

        let agents = load_agents(self.store.as_ref(), &self.tables).await?;
        require_active(&agents, input.to)?;

        let held = load_assignments(
            self.store.as_ref(),
            &self.tables,
            &Filter::new().eq("agent_id", input.from.value()),
        )
        .await?;
        if held.is_empty() {
            info!(from = %input.from, "Agent holds no leads, nothing to transfer");
            return Ok(TransferLeadsOutput::default());
        }
        let held: Vec<LeadId> = held.into_iter().map(|a| a.lead_id).collect();

        let assigned_at = Utc::now().to_rfc3339();
        let mut patch = Row::new();
        patch.insert("agent_id".to_string(), Value::from(input.to.value()));
        patch.insert(
            "assignment_type".to_string(),
            Value::from(AllocationType::Transferred.as_str()),
        );
        patch.insert(
            "assigned_by".to_string(),
            Value::from(input.assigned_by.as_str()),
        );
        patch.insert("assigned_at".to_string(), Value::from(assigned_at.as_str()));

        // Only rows still held by `from` move; anything reassigned meantime stays put
        let outcome = self
            .store
            .batch(vec![WriteOp::Update {
                table: self.tables.assignments.clone(),
                patch,
                filter: Filter::new()
                    .eq("agent_id", input.from.value())
                    .in_list("lead_id", lead_id_values(&held)),
            }])
            .await?;

        let moved: Vec<LeadId> = load_assignments(
            self.store.as_ref(),
            &self.tables,
            &Filter::new()
                .eq("agent_id", input.to.value())
                .eq("assigned_at", assigned_at.as_str())
                .in_list("lead_id", lead_id_values(&held)),
        )
        .await?
        .into_iter()
        .map(|a| a.lead_id)
        .collect();
        if moved.len() != outcome.updated {
            warn!(
                updated = outcome.updated,
                found = moved.len(),
                "Transferred rows changed again before they could be read back"
            );
        }
        if moved.len() < held.len() {
            info!(
                skipped = held.len() - moved.len(),
                "Some leads changed hands during the transfer and were left alone"
            );
        }

        info!(from = %input.from, to = %input.to, moved = moved.len(), "Leads transferred");
        self.audit.record(AuditEvent::new(
            "leads_transferred",
            serde_json::json!({
                "from": input.from,
                "to": input.to,
                "assigned_by": input.assigned_by,
                "lead_ids": moved,
            }),
        ));

        Ok(TransferLeadsOutput { moved })
    }
}
