//! Store table names.

/// Names of the tables the use cases operate on.
///
/// The allocation logic never hardcodes a table; everything is injected here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub leads: String,
    pub assignments: String,
    pub agents: String,
    pub deals: String,
    pub pipeline_stages: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            leads: "leads".to_string(),
            assignments: "lead_assignments".to_string(),
            agents: "agents".to_string(),
            deals: "deals".to_string(),
            pipeline_stages: "pipeline_stages".to_string(),
        }
    }
}

impl TableNames {
    /// All table names, for iteration in loaders and validators
    pub fn all(&self) -> [&str; 5] {
        [
            &self.leads,
            &self.assignments,
            &self.agents,
            &self.deals,
            &self.pipeline_stages,
        ]
    }
}
