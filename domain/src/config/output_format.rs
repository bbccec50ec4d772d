//! Output format value object

use serde::{Deserialize, Serialize};

/// Output format for assignment reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table grouped by agent (default)
    #[default]
    Table,
    /// JSON output
    Json,
}
