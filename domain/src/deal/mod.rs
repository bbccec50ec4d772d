//! Deal pipeline domain.
//!
//! - [`entities::Deal`]: a sales opportunity created at most once per lead
//! - [`entities::PipelineStage`]: an ordered step in a pipeline

pub mod entities;
