//! Defaults for assignment runs.

use leadflow_domain::RoundingRule;

/// Run-wide defaults that the CLI and use cases share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentSettings {
    /// Rounding rule for per-agent counts
    pub rounding: RoundingRule,
    /// Actor recorded as `assigned_by` on new allocations
    pub assigned_by: String,
    /// Create deals for newly assigned leads unless told otherwise
    pub create_deals: bool,
    /// Pipeline new deals are created in
    pub pipeline_id: Option<String>,
}

impl Default for AssignmentSettings {
    fn default() -> Self {
        Self {
            rounding: RoundingRule::default(),
            assigned_by: "admin".to_string(),
            create_deals: false,
            pipeline_id: None,
        }
    }
}

impl AssignmentSettings {
    pub fn with_rounding(mut self, rounding: RoundingRule) -> Self {
        self.rounding = rounding;
        self
    }

    pub fn with_assigned_by(mut self, actor: impl Into<String>) -> Self {
        self.assigned_by = actor.into();
        self
    }

    pub fn with_pipeline(mut self, pipeline_id: impl Into<String>) -> Self {
        self.pipeline_id = Some(pipeline_id.into());
        self
    }

    /// Pipeline to use when deal creation is requested explicitly or by default.
    ///
    /// Returns `None` when deals are not wanted.
    pub fn deal_pipeline(&self, requested: bool, override_pipeline: Option<&str>) -> Option<String> {
        if !(requested || self.create_deals) {
            return None;
        }
        override_pipeline
            .map(str::to_string)
            .or_else(|| self.pipeline_id.clone())
    }
}
