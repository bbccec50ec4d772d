//! Table name configuration from TOML (`[tables]` section)

use leadflow_application::TableNames;
use leadflow_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

/// Raw table names from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTablesConfig {
    pub leads: String,
    pub assignments: String,
    pub agents: String,
    pub deals: String,
    pub pipeline_stages: String,
}

impl Default for FileTablesConfig {
    fn default() -> Self {
        let names = TableNames::default();
        Self {
            leads: names.leads,
            assignments: names.assignments,
            agents: names.agents,
            deals: names.deals,
            pipeline_stages: names.pipeline_stages,
        }
    }
}

impl FileTablesConfig {
    /// Convert to [`TableNames`], reporting empty names.
    ///
    /// An empty name falls back to its default.
    pub fn to_table_names(&self) -> (TableNames, Vec<ConfigIssue>) {
        let defaults = TableNames::default();
        let mut issues = Vec::new();

        let mut pick = |field: &str, value: &str, fallback: String| {
            if value.trim().is_empty() {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::EmptyValue {
                        field: format!("tables.{}", field),
                    },
                    format!("tables.{}: table name must not be empty", field),
                ));
                fallback
            } else {
                value.trim().to_string()
            }
        };

        let names = TableNames {
            leads: pick("leads", &self.leads, defaults.leads),
            assignments: pick("assignments", &self.assignments, defaults.assignments),
            agents: pick("agents", &self.agents, defaults.agents),
            deals: pick("deals", &self.deals, defaults.deals),
            pipeline_stages: pick(
                "pipeline_stages",
                &self.pipeline_stages,
                defaults.pipeline_stages,
            ),
        };
        (names, issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_application_defaults() {
        let (names, issues) = FileTablesConfig::default().to_table_names();
        assert_eq!(names, TableNames::default());
        assert!(issues.is_empty());
    }

    #[test]
    fn test_empty_name_is_reported() {
        let config = FileTablesConfig {
            deals: "  ".to_string(),
            ..Default::default()
        };
        let (names, issues) = config.to_table_names();
        assert_eq!(names.deals, "deals");
        assert_eq!(issues.len(), 1);
        assert!(issues[0].is_error());
        assert_eq!(
            issues[0].code,
            ConfigIssueCode::EmptyValue {
                field: "tables.deals".to_string()
            }
        );
    }
}
