//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod audit;
mod distribution;
mod output;
mod store;
mod tables;

pub use audit::FileAuditConfig;
pub use distribution::FileDistributionConfig;
pub use output::FileOutputConfig;
pub use store::FileStoreConfig;
pub use tables::FileTablesConfig;

use leadflow_application::{AssignmentSettings, TableNames};
use leadflow_domain::ConfigIssue;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Snapshot location
    pub store: FileStoreConfig,
    /// Table names in the store
    pub tables: FileTablesConfig,
    /// Allocation defaults
    pub distribution: FileDistributionConfig,
    /// Audit trail settings
    pub audit: FileAuditConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    pub fn to_table_names(&self) -> TableNames {
        self.tables.to_table_names().0
    }

    pub fn to_settings(&self) -> (AssignmentSettings, Vec<ConfigIssue>) {
        self.distribution.to_settings()
    }

    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checks empty table names, the rounding rule, the assigned_by actor,
    /// and `create_deals` without a pipeline.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.tables.to_table_names().1);
        issues.extend(self.distribution.to_settings().1);
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadflow_domain::{OutputFormat, RoundingRule};
    use std::path::PathBuf;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[store]
data_file = "/var/lib/leadflow/data.json"

[tables]
assignments = "assignments"

[distribution]
rounding = "half_even"
assigned_by = "ops"
create_deals = true
pipeline_id = "sales"

[audit]
enabled = false

[output]
format = "json"
color = false
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.store.data_file,
            PathBuf::from("/var/lib/leadflow/data.json")
        );
        assert_eq!(config.to_table_names().assignments, "assignments");
        assert_eq!(config.to_table_names().leads, "leads");
        let (settings, issues) = config.to_settings();
        assert!(issues.is_empty());
        assert_eq!(settings.rounding, RoundingRule::HalfEven);
        assert_eq!(settings.pipeline_id.as_deref(), Some("sales"));
        assert!(!config.audit.enabled);
        assert_eq!(config.output.format, Some(OutputFormat::Json));
        assert!(!config.output.color);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: FileConfig = toml::from_str("[distribution]\nassigned_by = \"ops\"\n").unwrap();
        assert_eq!(config.distribution.assigned_by, "ops");
        assert_eq!(config.distribution.rounding, "half_up");
        assert!(config.audit.enabled);
        assert!(config.output.color);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(FileConfig::default().validate().is_empty());
    }

    #[test]
    fn test_validate_collects_all_issues() {
        let toml_str = r#"
[tables]
leads = ""

[distribution]
rounding = "nearest"
create_deals = true
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.validate();
        assert_eq!(issues.len(), 3);
        assert_eq!(issues.iter().filter(|i| i.is_error()).count(), 2);
    }
}
