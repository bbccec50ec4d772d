//! Store configuration from TOML (`[store]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw store configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStoreConfig {
    /// JSON snapshot the store is loaded from and saved to
    pub data_file: PathBuf,
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("leadflow-data.json"),
        }
    }
}
