//! Infrastructure layer for leadflow
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod store;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileAuditConfig, FileConfig, FileDistributionConfig, FileOutputConfig,
    FileStoreConfig, FileTablesConfig,
};
pub use logging::JsonlAuditLog;
pub use store::{InMemoryRecordStore, SnapshotError};
