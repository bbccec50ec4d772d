//! Application layer for leadflow
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::{AssignmentSettings, TableNames};
pub use ports::{
    audit_log::{AuditEvent, AuditLog, NoAuditLog},
    progress::{NoProgress, ProgressNotifier, RunStep},
    record_store::{BatchOutcome, Condition, Filter, RecordStore, Row, StoreError, WriteOp},
};
pub use use_cases::assign_leads::{
    AssignLeadsError, AssignLeadsInput, AssignLeadsOutput, AssignLeadsUseCase,
};
pub use use_cases::build_report::{BuildReportError, BuildReportUseCase};
pub use use_cases::distribute_leads::{
    DistributeLeadsError, DistributeLeadsInput, DistributeLeadsOutput, DistributeLeadsUseCase,
};
pub use use_cases::find_orphans::{FindOrphansUseCase, OrphanGroup};
pub use use_cases::project_deals::{
    DealOptions, DealProjection, ProjectDealsError, ProjectDealsInput, ProjectDealsUseCase,
};
pub use use_cases::transfer_leads::{
    TransferLeadsError, TransferLeadsInput, TransferLeadsOutput, TransferLeadsUseCase,
};
pub use use_cases::unassign_leads::{UnassignLeadsError, UnassignLeadsUseCase};
