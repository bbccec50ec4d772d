//! Allocation Engine
//!
//! Turns a percentage request plus a pool of unassigned leads into a
//! concrete, randomized, remainder-complete list of (lead, agent) pairs.
//!
//! The engine has no side effects. Persisting the plan is the caller's job.

use crate::allocation::request::PercentageAllocationRequest;
use crate::allocation::rounding::RoundingRule;
use crate::core::error::DomainError;
use crate::core::ids::{AgentId, LeadId};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// One lead bound for one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedAssignment {
    pub lead_id: LeadId,
    pub agent_id: AgentId,
}

/// Output of a single engine run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationPlan {
    pub assignments: Vec<PlannedAssignment>,
    /// Leads handed out by the remainder rule rather than by share
    pub remainder: usize,
    pub remainder_agent: Option<AgentId>,
}

impl AllocationPlan {
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Number of leads each agent received
    pub fn counts_by_agent(&self) -> BTreeMap<AgentId, usize> {
        let mut counts = BTreeMap::new();
        for a in &self.assignments {
            *counts.entry(a.agent_id).or_insert(0) += 1;
        }
        counts
    }

    pub fn lead_ids(&self) -> Vec<LeadId> {
        self.assignments.iter().map(|a| a.lead_id.clone()).collect()
    }
}

/// Proportional lead distributor.
///
/// Counts are deterministic for a given pool size, request and rounding rule.
/// Which physical lead lands with which agent is decided by a uniform
/// (Fisher–Yates) shuffle driven by the caller's random source.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocationEngine {
    rounding: RoundingRule,
}

impl AllocationEngine {
    pub fn new(rounding: RoundingRule) -> Self {
        Self { rounding }
    }

    pub fn rounding(&self) -> RoundingRule {
        self.rounding
    }

    /// Partition `pool` between the agents of `request`.
    ///
    /// The request is re-validated here; an invalid one never produces a plan.
    pub fn allocate<R: Rng + ?Sized>(
        &self,
        pool: &[LeadId],
        request: &PercentageAllocationRequest,
        rng: &mut R,
    ) -> Result<AllocationPlan, DomainError> {
        request.validate()?;

        let mut seen = HashSet::with_capacity(pool.len());
        for lead in pool {
            if !seen.insert(lead) {
                return Err(DomainError::InvalidRequest(format!(
                    "lead {} appears more than once in the pool",
                    lead
                )));
            }
        }

        if pool.is_empty() {
            return Ok(AllocationPlan::default());
        }

        let mut shuffled = pool.to_vec();
        shuffled.shuffle(rng);

        let mut assignments = Vec::with_capacity(shuffled.len());
        let mut cursor = 0;

        for share in request.participating() {
            let wanted = self.rounding.share(share.percentage, shuffled.len());
            let take = wanted.min(shuffled.len() - cursor);
            assignments.extend(shuffled[cursor..cursor + take].iter().map(|lead| {
                PlannedAssignment {
                    lead_id: lead.clone(),
                    agent_id: share.agent_id,
                }
            }));
            cursor += take;
        }

        let remainder = shuffled.len() - cursor;
        let remainder_agent = if remainder > 0 {
            let agent_id = request
                .remainder_recipient()
                .ok_or(DomainError::RemainderUnassigned(remainder))?;
            assignments.extend(shuffled[cursor..].iter().map(|lead| PlannedAssignment {
                lead_id: lead.clone(),
                agent_id,
            }));
            Some(agent_id)
        } else {
            None
        };

        Ok(AllocationPlan {
            assignments,
            remainder,
            remainder_agent,
        })
    }
}
