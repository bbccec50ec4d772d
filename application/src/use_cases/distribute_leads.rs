//! Distribute Leads use case
//!
//! Splits the pool of unassigned leads between agents by percentage.
//!
//! 1. Validate the request (before any store call)
//! 2. Load agents, leads and current assignments; the pool is every
//!    unassigned lead matching the optional course filter
//! 3. Run the [`AllocationEngine`]
//! 4. Write all allocations in one batch guarded by "still unassigned"
//! 5. Optionally project deals for the new assignments
//! 6. Group the result per agent

use crate::config::TableNames;
use crate::ports::audit_log::{AuditEvent, AuditLog, NoAuditLog};
use crate::ports::progress::{NoProgress, ProgressNotifier, RunStep};
use crate::ports::record_store::{Filter, RecordStore, StoreError, WriteOp};
use crate::use_cases::project_deals::{self, DealOptions, DealProjection, ProjectDealsError};
use crate::use_cases::shared::{lead_id_values, load_agents, load_leads, require_active, to_row};
use leadflow_domain::{
    AgentId, Allocation, AllocationEngine, AllocationPlan, AllocationStatus, AllocationType,
    AssignmentReport, DomainError, LeadId, PercentageAllocationRequest, RoundingRule,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Errors that can occur during a distribution run
#[derive(Error, Debug)]
pub enum DistributeLeadsError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Allocations were committed but deal creation failed afterwards
    #[error("{assigned} leads assigned, but deal creation failed after {deals_created} deals: {source}")]
    PartialFailure {
        assigned: usize,
        deals_created: usize,
        #[source]
        source: ProjectDealsError,
    },
}

impl DistributeLeadsError {
    /// Whether anything was written before the error
    pub fn has_partial_effect(&self) -> bool {
        matches!(self, DistributeLeadsError::PartialFailure { .. })
    }
}

/// Input for the DistributeLeads use case
#[derive(Debug, Clone)]
pub struct DistributeLeadsInput {
    pub request: PercentageAllocationRequest,
    /// Only leads of this course enter the pool
    pub course_id: Option<String>,
    pub assigned_by: String,
    pub deals: Option<DealOptions>,
}

impl DistributeLeadsInput {
    pub fn new(request: PercentageAllocationRequest, assigned_by: impl Into<String>) -> Self {
        Self {
            request,
            course_id: None,
            assigned_by: assigned_by.into(),
            deals: None,
        }
    }

    pub fn with_course(mut self, course_id: impl Into<String>) -> Self {
        self.course_id = Some(course_id.into());
        self
    }

    pub fn with_deals(mut self, options: DealOptions) -> Self {
        self.deals = Some(options);
        self
    }
}

/// Output of a distribution run
#[derive(Debug, Clone)]
pub struct DistributeLeadsOutput {
    pub plan: AllocationPlan,
    pub report: AssignmentReport,
    pub deals: Option<DealProjection>,
}

/// Use case for percentage-based lead distribution
pub struct DistributeLeadsUseCase<S: RecordStore + 'static> {
    store: Arc<S>,
    tables: TableNames,
    engine: AllocationEngine,
    rng: Mutex<StdRng>,
    audit: Arc<dyn AuditLog>,
}

impl<S: RecordStore + 'static> DistributeLeadsUseCase<S> {
    pub fn new(store: Arc<S>, tables: TableNames) -> Self {
        Self {
            store,
            tables,
            engine: AllocationEngine::default(),
            rng: Mutex::new(StdRng::from_entropy()),
            audit: Arc::new(NoAuditLog),
        }
    }

    pub fn with_rounding(mut self, rounding: RoundingRule) -> Self {
        self.engine = AllocationEngine::new(rounding);
        self
    }

    /// Make the shuffle reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn with_audit_log(mut self, audit: Arc<dyn AuditLog>) -> Self {
        self.audit = audit;
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: DistributeLeadsInput,
    ) -> Result<DistributeLeadsOutput, DistributeLeadsError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: DistributeLeadsInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<DistributeLeadsOutput, DistributeLeadsError> {
        input.request.validate()?;

        progress.on_step_start(RunStep::Load);
        let agents = load_agents(self.store.as_ref(), &self.tables).await?;
        for share in input.request.participating() {
            require_active(&agents, share.agent_id)?;
        }

        let lead_filter = match &input.course_id {
            Some(course) => Filter::new().eq("course_id", course.as_str()),
            None => Filter::new(),
        };
        let leads = load_leads(self.store.as_ref(), &self.tables, &lead_filter).await?;
        let pool: Vec<LeadId> = leads
            .iter()
            .filter(|l| !l.is_assigned())
            .map(|l| l.id.clone())
            .collect();
        if pool.is_empty() {
            progress.on_step_failed(RunStep::Load, "no unassigned leads");
            return Err(DomainError::NoLeads.into());
        }
        info!(
            "Distributing {} of {} leads between {} agents",
            pool.len(),
            leads.len(),
            input.request.participating().count()
        );
        progress.on_step_complete(RunStep::Load, &format!("{} unassigned leads", pool.len()));

        progress.on_step_start(RunStep::Allocate);
        let plan = {
            let mut rng = self.rng.lock().await;
            self.engine.allocate(&pool, &input.request, &mut *rng)?
        };
        for (agent_id, count) in plan.counts_by_agent() {
            debug!(agent = %agent_id, count, "Planned share");
        }
        if let Some(agent) = plan.remainder_agent {
            debug!(agent = %agent, remainder = plan.remainder, "Remainder assigned");
        }
        progress.on_step_complete(RunStep::Allocate, &format!("{} assignments planned", plan.len()));

        progress.on_step_start(RunStep::Persist);
        let rows = plan
            .assignments
            .iter()
            .map(|a| {
                let allocation = Allocation::new(
                    a.lead_id.clone(),
                    a.agent_id,
                    input.assigned_by.clone(),
                    AllocationType::Distributed,
                );
                to_row(&self.tables.assignments, &allocation)
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Completed history rows for pooled leads are replaced, so each lead keeps one row
        let ops = vec![
            WriteOp::Delete {
                table: self.tables.assignments.clone(),
                filter: Filter::new()
                    .in_list("lead_id", lead_id_values(&pool))
                    .eq("status", AllocationStatus::Completed.as_str()),
            },
            WriteOp::ExpectNone {
                table: self.tables.assignments.clone(),
                filter: Filter::new().in_list("lead_id", lead_id_values(&pool)),
            },
            WriteOp::Insert {
                table: self.tables.assignments.clone(),
                rows,
            },
        ];
        if let Err(e) = self.store.batch(ops).await {
            if e.is_conflict() {
                warn!("Pool changed while distributing, nothing written: {}", e);
            }
            progress.on_step_failed(RunStep::Persist, &e.to_string());
            return Err(e.into());
        }
        progress.on_step_complete(RunStep::Persist, &format!("{} leads assigned", plan.len()));

        let pairs: Vec<(LeadId, AgentId)> = plan
            .assignments
            .iter()
            .map(|a| (a.lead_id.clone(), a.agent_id))
            .collect();

        let deals = match &input.deals {
            Some(options) => {
                progress.on_step_start(RunStep::ProjectDeals);
                match project_deals::project(
                    self.store.as_ref(),
                    &self.tables,
                    &pairs,
                    &leads,
                    &options.pipeline_id,
                )
                .await
                {
                    Ok(projection) => {
                        progress.on_step_complete(
                            RunStep::ProjectDeals,
                            &format!("{} deals created", projection.created.len()),
                        );
                        Some(projection)
                    }
                    Err(source) => {
                        warn!("Deal creation failed after assignment: {}", source);
                        progress.on_step_failed(RunStep::ProjectDeals, &source.to_string());
                        self.record(&input, &plan, None);
                        return Err(DistributeLeadsError::PartialFailure {
                            assigned: plan.len(),
                            deals_created: 0,
                            source,
                        });
                    }
                }
            }
            None => None,
        };

        self.record(&input, &plan, deals.as_ref());

        let report = AssignmentReport::build(pairs.iter().map(|(l, a)| (l, *a)), &leads, &agents);

        Ok(DistributeLeadsOutput {
            plan,
            report,
            deals,
        })
    }

    fn record(
        &self,
        input: &DistributeLeadsInput,
        plan: &AllocationPlan,
        deals: Option<&DealProjection>,
    ) {
        let counts: serde_json::Map<String, serde_json::Value> = plan
            .counts_by_agent()
            .into_iter()
            .map(|(agent, count)| (agent.to_string(), serde_json::json!(count)))
            .collect();
        self.audit.record(AuditEvent::new(
            "leads_distributed",
            serde_json::json!({
                "assigned_by": input.assigned_by,
                "course_id": input.course_id,
                "rounding": self.engine.rounding().as_str(),
                "shares": input.request.shares,
                "counts": counts,
                "remainder": plan.remainder,
                "deals_created": deals.map(|d| d.created.len()),
            }),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockStore, RecordingAudit, assignment_row, seeded_store};
    use leadflow_domain::AgentShare;
    use std::collections::HashSet;

    // ==================== Helpers ====================

    fn request(shares: &[(i64, u32)]) -> PercentageAllocationRequest {
        PercentageAllocationRequest::new(
            shares.iter().map(|&(a, p)| AgentShare::new(a, p)).collect(),
        )
    }

    fn use_case(store: Arc<MockStore>, tables: &TableNames) -> DistributeLeadsUseCase<MockStore> {
        DistributeLeadsUseCase::new(store, tables.clone()).with_seed(7)
    }

    fn agent_counts(store: &MockStore, tables: &TableNames) -> (usize, usize) {
        let rows = store.rows(&tables.assignments);
        let a = rows.iter().filter(|r| r["agent_id"] == 1).count();
        let b = rows.iter().filter(|r| r["agent_id"] == 2).count();
        (a, b)
    }

    // ==================== Tests ====================

    #[tokio::test]
    async fn test_distributes_seventy_thirty() {
        let tables = TableNames::default();
        let store = Arc::new(seeded_store(&tables));

        let output = use_case(store.clone(), &tables)
            .execute(DistributeLeadsInput::new(request(&[(1, 70), (2, 30)]), "ops"))
            .await
            .unwrap();

        assert_eq!(output.plan.len(), 10);
        assert_eq!(agent_counts(&store, &tables), (7, 3));

        let rows = store.rows(&tables.assignments);
        let unique: HashSet<String> = rows
            .iter()
            .map(|r| r["lead_id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(unique.len(), 10);
        assert!(rows.iter().all(|r| r["assignment_type"] == "distributed"));
        assert!(rows.iter().all(|r| r["assigned_by"] == "ops"));

        assert_eq!(output.report.total_count, 10);
        assert_eq!(output.report.group(AgentId::new(1)).unwrap().agent_name, "Ana");
        assert!((output.report.total_value - 5500.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_invalid_total_makes_no_store_calls() {
        let tables = TableNames::default();
        for shares in [&[(1, 70), (2, 29)][..], &[(1, 70), (2, 31)][..]] {
            let store = Arc::new(seeded_store(&tables));
            let result = use_case(store.clone(), &tables)
                .execute(DistributeLeadsInput::new(request(shares), "ops"))
                .await;

            assert!(matches!(
                result,
                Err(DistributeLeadsError::Domain(DomainError::InvalidPercentageTotal(_)))
            ));
            assert_eq!(store.calls(), 0);
        }
    }

    #[tokio::test]
    async fn test_wrapping_percentages_make_no_store_calls() {
        let tables = TableNames::default();
        let store = Arc::new(seeded_store(&tables));

        let result = use_case(store.clone(), &tables)
            .execute(DistributeLeadsInput::new(request(&[(1, u32::MAX), (2, 101)]), "ops"))
            .await;

        assert!(matches!(
            result,
            Err(DistributeLeadsError::Domain(DomainError::InvalidRequest(_)))
        ));
        assert_eq!(store.calls(), 0);
        assert!(store.rows(&tables.assignments).is_empty());
    }

    #[tokio::test]
    async fn test_inactive_agent_rejected_without_writes() {
        let tables = TableNames::default();
        let store = Arc::new(seeded_store(&tables));

        let result = use_case(store.clone(), &tables)
            .execute(DistributeLeadsInput::new(request(&[(1, 50), (3, 50)]), "ops"))
            .await;

        assert!(matches!(
            result,
            Err(DistributeLeadsError::Domain(DomainError::InactiveAgent(id))) if id == AgentId::new(3)
        ));
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_zero_share_agent_may_be_inactive() {
        let tables = TableNames::default();
        let store = Arc::new(seeded_store(&tables));

        let output = use_case(store.clone(), &tables)
            .execute(DistributeLeadsInput::new(request(&[(3, 0), (1, 100)]), "ops"))
            .await
            .unwrap();

        assert_eq!(output.plan.counts_by_agent().get(&AgentId::new(3)), None);
        assert_eq!(agent_counts(&store, &tables), (10, 0));
    }

    #[tokio::test]
    async fn test_only_unassigned_leads_enter_pool() {
        let tables = TableNames::default();
        let store = Arc::new(
            seeded_store(&tables).with_rows(
                &tables.assignments,
                vec![assignment_row("L1", 2), assignment_row("L2", 2)],
            ),
        );

        let output = use_case(store.clone(), &tables)
            .execute(DistributeLeadsInput::new(request(&[(1, 100)]), "ops"))
            .await
            .unwrap();

        assert_eq!(output.plan.len(), 8);
        assert!(!output.plan.lead_ids().contains(&LeadId::new("L1")));
        // Prior holders keep their leads
        assert_eq!(agent_counts(&store, &tables), (8, 2));
    }

    #[tokio::test]
    async fn test_completed_allocation_returns_lead_to_pool() {
        let tables = TableNames::default();
        let mut done = assignment_row("L1", 2);
        done["status"] = serde_json::json!("completed");
        let store = Arc::new(
            seeded_store(&tables)
                .with_rows(&tables.assignments, vec![done, assignment_row("L2", 2)]),
        );

        let output = use_case(store.clone(), &tables)
            .execute(DistributeLeadsInput::new(request(&[(1, 100)]), "ops"))
            .await
            .unwrap();

        assert_eq!(output.plan.len(), 9);
        assert!(output.plan.lead_ids().contains(&LeadId::new("L1")));
        let rows = store.rows(&tables.assignments);
        let l1: Vec<_> = rows.iter().filter(|r| r["lead_id"] == "L1").collect();
        assert_eq!(l1.len(), 1);
        assert_eq!(l1[0]["agent_id"], 1);
        assert_eq!(l1[0]["status"], "active");
    }

    #[tokio::test]
    async fn test_course_prefilter() {
        let tables = TableNames::default();
        let store = Arc::new(seeded_store(&tables));

        let output = use_case(store.clone(), &tables)
            .execute(
                DistributeLeadsInput::new(request(&[(1, 50), (2, 50)]), "ops")
                    .with_course("go-201"),
            )
            .await
            .unwrap();

        let mut ids = output.plan.lead_ids();
        ids.sort();
        assert_eq!(
            ids,
            vec![
                LeadId::new("L10"),
                LeadId::new("L7"),
                LeadId::new("L8"),
                LeadId::new("L9")
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_pool_is_rejected() {
        let tables = TableNames::default();
        let store = Arc::new(seeded_store(&tables));

        let result = use_case(store.clone(), &tables)
            .execute(DistributeLeadsInput::new(request(&[(1, 100)]), "ops").with_course("none"))
            .await;

        assert!(matches!(
            result,
            Err(DistributeLeadsError::Domain(DomainError::NoLeads))
        ));
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_creates_deals_when_requested() {
        let tables = TableNames::default();
        let store = Arc::new(seeded_store(&tables));

        let output = use_case(store.clone(), &tables)
            .execute(
                DistributeLeadsInput::new(request(&[(1, 60), (2, 40)]), "ops")
                    .with_deals(DealOptions::new("sales")),
            )
            .await
            .unwrap();

        let deals = output.deals.unwrap();
        assert_eq!(deals.created.len(), 10);
        let deal_rows = store.rows(&tables.deals);
        assert_eq!(deal_rows.len(), 10);
        assert!(deal_rows.iter().all(|r| r["stage_id"] == "new"));
    }

    #[tokio::test]
    async fn test_deal_failure_reports_partial_effect() {
        let tables = TableNames::default();
        let store = Arc::new(seeded_store(&tables));
        store.fail_writes_to(&tables.deals);

        let result = use_case(store.clone(), &tables)
            .execute(
                DistributeLeadsInput::new(request(&[(1, 50), (2, 50)]), "ops")
                    .with_deals(DealOptions::new("sales")),
            )
            .await;

        match result {
            Err(DistributeLeadsError::PartialFailure {
                assigned,
                deals_created,
                ..
            }) => {
                assert_eq!(assigned, 10);
                assert_eq!(deals_created, 0);
            }
            other => panic!("expected partial failure, got {:?}", other),
        }
        // Allocations stay committed
        assert_eq!(store.rows(&tables.assignments).len(), 10);
        assert!(store.rows(&tables.deals).is_empty());
    }

    #[tokio::test]
    async fn test_assignment_write_failure_leaves_nothing() {
        let tables = TableNames::default();
        let store = Arc::new(seeded_store(&tables));
        store.fail_writes_to(&tables.assignments);

        let result = use_case(store.clone(), &tables)
            .execute(DistributeLeadsInput::new(request(&[(1, 50), (2, 50)]), "ops"))
            .await;

        assert!(matches!(result, Err(DistributeLeadsError::Store(StoreError::Backend(_)))));
        assert!(store.rows(&tables.assignments).is_empty());
    }

    #[tokio::test]
    async fn test_same_seed_same_counts_different_seed_same_counts() {
        let tables = TableNames::default();
        let mut counts = Vec::new();
        for seed in [1, 2] {
            let store = Arc::new(seeded_store(&tables));
            DistributeLeadsUseCase::new(store.clone(), tables.clone())
                .with_seed(seed)
                .execute(DistributeLeadsInput::new(request(&[(1, 30), (2, 70)]), "ops"))
                .await
                .unwrap();
            counts.push(agent_counts(&store, &tables));
        }
        assert_eq!(counts[0], (3, 7));
        assert_eq!(counts[0], counts[1]);
    }

    #[tokio::test]
    async fn test_records_audit_event() {
        let tables = TableNames::default();
        let store = Arc::new(seeded_store(&tables));
        let audit = Arc::new(RecordingAudit::default());

        use_case(store, &tables)
            .with_audit_log(audit.clone())
            .execute(DistributeLeadsInput::new(request(&[(1, 100)]), "ops"))
            .await
            .unwrap();

        assert_eq!(audit.event_types(), vec!["leads_distributed"]);
    }
}
