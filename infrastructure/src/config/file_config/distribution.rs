//! Distribution configuration from TOML (`[distribution]` section)

use leadflow_application::AssignmentSettings;
use leadflow_domain::{ConfigIssue, ConfigIssueCode, RoundingRule};
use serde::{Deserialize, Serialize};

/// Raw distribution configuration from TOML
///
/// `rounding` stays a string so an unknown value becomes a reported issue
/// instead of a hard parse failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDistributionConfig {
    /// `"half_up"` (default) or `"half_even"`
    pub rounding: String,
    /// Actor recorded on new allocations
    pub assigned_by: String,
    /// Create deals for new assignments by default
    pub create_deals: bool,
    /// Pipeline new deals are created in
    pub pipeline_id: Option<String>,
}

impl Default for FileDistributionConfig {
    fn default() -> Self {
        let settings = AssignmentSettings::default();
        Self {
            rounding: settings.rounding.as_str().to_string(),
            assigned_by: settings.assigned_by,
            create_deals: settings.create_deals,
            pipeline_id: settings.pipeline_id,
        }
    }
}

impl FileDistributionConfig {
    pub fn parse_rounding(&self) -> (RoundingRule, Vec<ConfigIssue>) {
        match self.rounding.parse::<RoundingRule>() {
            Ok(rule) => (rule, vec![]),
            Err(_) => (
                RoundingRule::default(),
                vec![ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "distribution.rounding".to_string(),
                        value: self.rounding.clone(),
                        valid_values: vec!["half_up".to_string(), "half_even".to_string()],
                    },
                    format!(
                        "distribution.rounding: unknown value '{}', falling back to '{}'",
                        self.rounding,
                        RoundingRule::default()
                    ),
                )],
            ),
        }
    }

    /// Convert to [`AssignmentSettings`], collecting every issue found.
    pub fn to_settings(&self) -> (AssignmentSettings, Vec<ConfigIssue>) {
        let (rounding, mut issues) = self.parse_rounding();

        let assigned_by = if self.assigned_by.trim().is_empty() {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::EmptyValue {
                    field: "distribution.assigned_by".to_string(),
                },
                "distribution.assigned_by: empty, using 'admin'",
            ));
            AssignmentSettings::default().assigned_by
        } else {
            self.assigned_by.trim().to_string()
        };

        let pipeline_id = self
            .pipeline_id
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        if self.create_deals && pipeline_id.is_none() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::MissingDependency {
                    field: "distribution.create_deals".to_string(),
                    requires: "distribution.pipeline_id".to_string(),
                },
                "distribution.create_deals is enabled but no pipeline_id is set",
            ));
        }

        let settings = AssignmentSettings {
            rounding,
            assigned_by,
            create_deals: self.create_deals,
            pipeline_id,
        };
        (settings, issues)
    }
}
