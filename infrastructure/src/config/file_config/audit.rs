//! Audit log configuration from TOML (`[audit]` section)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Raw audit log configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAuditConfig {
    /// Append an audit event per completed operation
    pub enabled: bool,
    /// JSONL file to append to. Defaults to `<data_file>.audit.jsonl`.
    pub path: Option<PathBuf>,
}

impl Default for FileAuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl FileAuditConfig {
    /// Where events go, or `None` when auditing is disabled
    pub fn resolve_path(&self, data_file: &Path) -> Option<PathBuf> {
        if !self.enabled {
            return None;
        }
        Some(
            self.path
                .clone()
                .unwrap_or_else(|| data_file.with_extension("audit.jsonl")),
        )
    }
}
