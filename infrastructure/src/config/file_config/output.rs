//! `[output]` section: how command results are printed

use leadflow_domain::OutputFormat;
use serde::{Deserialize, Serialize};

/// Raw output settings from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Format used when `--output` is not given; unset means table
    pub format: Option<OutputFormat>,
    /// Colorize the report table and summaries
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
        }
    }
}

impl FileOutputConfig {
    /// The `--output` flag wins over the configured format
    pub fn resolve_format(&self, flag: Option<OutputFormat>) -> OutputFormat {
        flag.or(self.format).unwrap_or_default()
    }
}
