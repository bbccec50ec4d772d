//! Deal and pipeline stage entities

use crate::core::ids::{AgentId, LeadId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An ordered step in a sales pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStage {
    pub id: String,
    pub pipeline_id: String,
    #[serde(default)]
    pub name: String,
    pub stage_order: i32,
}

/// The stage new deals start in: lowest `stage_order`.
pub fn first_stage(stages: &[PipelineStage]) -> Option<&PipelineStage> {
    stages.iter().min_by_key(|s| s.stage_order)
}

/// A pipeline-tracked sales opportunity.
///
/// There is never more than one deal per lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: String,
    pub lead_id: LeadId,
    pub pipeline_id: String,
    pub stage_id: String,
    pub agent_id: AgentId,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub consultation_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(id: &str, order: i32) -> PipelineStage {
        PipelineStage {
            id: id.to_string(),
            pipeline_id: "sales".to_string(),
            name: id.to_string(),
            stage_order: order,
        }
    }

    #[test]
    fn test_first_stage_by_order_not_position() {
        let stages = vec![stage("won", 3), stage("new", 1), stage("call", 2)];
        assert_eq!(first_stage(&stages).map(|s| s.id.as_str()), Some("new"));
    }

    #[test]
    fn test_first_stage_empty() {
        assert!(first_stage(&[]).is_none());
    }
}
