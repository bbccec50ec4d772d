//! Configuration file loading for leadflow
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `LEADFLOW_*` environment variables (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./leadflow.toml` or `./.leadflow.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/leadflow/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileAuditConfig, FileConfig, FileDistributionConfig, FileOutputConfig, FileStoreConfig,
    FileTablesConfig,
};
pub use loader::ConfigLoader;
