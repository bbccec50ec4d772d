//! Deal Projector
//!
//! Creates a deal at the pipeline's first stage for every assigned lead that
//! does not have one yet. Existing deals are never touched or duplicated.
//!
//! Existence is checked with one bulk lookup and missing deals are written in
//! one insert, so the number of store round-trips does not grow with the
//! batch size.

use crate::config::TableNames;
use crate::ports::audit_log::{AuditEvent, AuditLog, NoAuditLog};
use crate::ports::record_store::{Filter, RecordStore, StoreError};
use crate::use_cases::shared::{
    decode_rows, dedup_ids, lead_id_values, load_assignments, load_leads, to_row,
};
use chrono::Utc;
use leadflow_domain::{AgentId, Deal, Lead, LeadId, PipelineStage, first_stage};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while projecting deals
#[derive(Error, Debug)]
pub enum ProjectDealsError {
    #[error("Pipeline {0} has no stages")]
    NoStages(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Request to create deals alongside an assignment run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealOptions {
    pub pipeline_id: String,
}

impl DealOptions {
    pub fn new(pipeline_id: impl Into<String>) -> Self {
        Self {
            pipeline_id: pipeline_id.into(),
        }
    }
}

/// Result of a projection
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DealProjection {
    pub created: Vec<Deal>,
    /// Leads that already had a deal
    pub skipped: Vec<LeadId>,
}

/// Create missing deals for `pairs`.
pub(crate) async fn project<S: RecordStore + ?Sized>(
    store: &S,
    tables: &TableNames,
    pairs: &[(LeadId, AgentId)],
    leads: &[Lead],
    pipeline_id: &str,
) -> Result<DealProjection, ProjectDealsError> {
    if pairs.is_empty() {
        return Ok(DealProjection::default());
    }

    let stage_rows = store
        .select(
            &tables.pipeline_stages,
            &Filter::new()
                .eq("pipeline_id", pipeline_id)
                .order_by("stage_order", true),
        )
        .await?;
    let stages: Vec<PipelineStage> = decode_rows(&tables.pipeline_stages, stage_rows)?;
    let stage = first_stage(&stages)
        .ok_or_else(|| ProjectDealsError::NoStages(pipeline_id.to_string()))?;

    let existing_rows = store
        .select(
            &tables.deals,
            &Filter::new().in_list("lead_id", lead_id_values(pairs.iter().map(|(l, _)| l))),
        )
        .await?;
    let mut seen: HashSet<LeadId> = existing_rows
        .iter()
        .filter_map(|row| row.get("lead_id").and_then(|v| v.as_str()))
        .map(LeadId::from)
        .collect();
    debug!("{} of {} leads already have deals", seen.len(), pairs.len());

    let by_id: HashMap<&LeadId, &Lead> = leads.iter().map(|l| (&l.id, l)).collect();
    let now = Utc::now();
    let mut projection = DealProjection::default();

    for (lead_id, agent_id) in pairs {
        if !seen.insert(lead_id.clone()) {
            projection.skipped.push(lead_id.clone());
            continue;
        }
        let lead = by_id.get(lead_id);
        projection.created.push(Deal {
            id: uuid::Uuid::new_v4().to_string(),
            lead_id: lead_id.clone(),
            pipeline_id: pipeline_id.to_string(),
            stage_id: stage.id.clone(),
            agent_id: *agent_id,
            value: lead.map(|l| l.value).unwrap_or(0.0),
            consultation_id: lead.and_then(|l| l.consultation_id.clone()),
            created_at: now,
        });
    }

    if !projection.created.is_empty() {
        let rows = projection
            .created
            .iter()
            .map(|deal| to_row(&tables.deals, deal))
            .collect::<Result<Vec<_>, _>>()?;
        store.insert(&tables.deals, rows).await?;
    }

    info!(
        created = projection.created.len(),
        skipped = projection.skipped.len(),
        pipeline = pipeline_id,
        "Deals projected"
    );
    Ok(projection)
}

/// Input for a standalone projection over current assignments
#[derive(Debug, Clone)]
pub struct ProjectDealsInput {
    pub pipeline_id: String,
    /// Restrict to these leads; empty means every assigned lead
    pub lead_ids: Vec<LeadId>,
}

/// Use case for creating deals for leads that are already assigned
pub struct ProjectDealsUseCase<S: RecordStore + 'static> {
    store: Arc<S>,
    tables: TableNames,
    audit: Arc<dyn AuditLog>,
}

impl<S: RecordStore + 'static> ProjectDealsUseCase<S> {
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
        input: ProjectDealsInput,
    ) -> Result<DealProjection, ProjectDealsError> {
        let filter = if input.lead_ids.is_empty() {
            Filter::new()
        } else {
            let ids = dedup_ids(&input.lead_ids);
            Filter::new().in_list("lead_id", lead_id_values(&ids))
        };

        let assignments = load_assignments(self.store.as_ref(), &self.tables, &filter).await?;
        let pairs: Vec<(LeadId, AgentId)> = assignments
            .into_iter()
            .map(|a| (a.lead_id, a.agent_id))
            .collect();
        if pairs.is_empty() {
            return Ok(DealProjection::default());
        }

        let leads = load_leads(
            self.store.as_ref(),
            &self.tables,
            &Filter::new().in_list("id", lead_id_values(pairs.iter().map(|(l, _)| l))),
        )
        .await?;

        let projection = project(
            self.store.as_ref(),
            &self.tables,
            &pairs,
            &leads,
            &input.pipeline_id,
        )
        .await?;

        self.audit.record(AuditEvent::new(
            "deals_projected",
            serde_json::json!({
                "pipeline_id": input.pipeline_id,
                "created": projection.created.iter().map(|d| d.lead_id.as_str()).collect::<Vec<_>>(),
                "skipped": projection.skipped.len(),
            }),
        ));

        Ok(projection)
    }
}
