//! Unassign Leads use case
//!
//! Removes the current allocation of the selected leads, returning them to
//! the unassigned pool for the next distribution run.

use crate::config::TableNames;
use crate::ports::audit_log::{AuditEvent, AuditLog, NoAuditLog};
use crate::ports::record_store::{Filter, RecordStore, StoreError, WriteOp};
use crate::use_cases::shared::{dedup_ids, lead_id_values};
use leadflow_domain::{DomainError, LeadId};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Errors that can occur while unassigning
#[derive(Error, Debug)]
pub enum UnassignLeadsError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Use case for releasing leads back to the pool
pub struct UnassignLeadsUseCase<S: RecordStore + 'static> {
    store: Arc<S>,
    tables: TableNames,
    audit: Arc<dyn AuditLog>,
}

impl<S: RecordStore + 'static> UnassignLeadsUseCase<S> {
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

    /// Returns how many allocations were removed
    pub async fn execute(&self, lead_ids: &[LeadId]) -> Result<usize, UnassignLeadsError> {
        let lead_ids = dedup_ids(lead_ids);
        if lead_ids.is_empty() {
            return Err(DomainError::NoLeads.into());
        }

        let outcome = self
            .store
            .batch(vec![WriteOp::Delete {
                table: self.tables.assignments.clone(),
                filter: Filter::new().in_list("lead_id", lead_id_values(&lead_ids)),
            }])
            .await?;

        info!(removed = outcome.deleted, "Leads unassigned");
        self.audit.record(AuditEvent::new(
            "leads_unassigned",
            serde_json::json!({
                "lead_ids": lead_ids,
                "removed": outcome.deleted,
            }),
        ));

        Ok(outcome.deleted)
    }
}
