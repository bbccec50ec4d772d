//! Progress notification port
//!
//! Defines the interface for reporting progress while an assignment run
//! walks through its store round-trips.

/// Steps of an assignment run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStep {
    /// Loading agents, leads and current assignments
    Load,
    /// Running the allocation engine
    Allocate,
    /// Writing the allocation batch
    Persist,
    /// Creating deals for the new assignments
    ProjectDeals,
}

impl RunStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStep::Load => "load",
            RunStep::Allocate => "allocate",
            RunStep::Persist => "persist",
            RunStep::ProjectDeals => "deals",
        }
    }
}

/// Callback for progress updates during an assignment run
///
/// Implementations live in the presentation layer.
pub trait ProgressNotifier: Send + Sync {
    /// Called when a step starts
    fn on_step_start(&self, step: RunStep);

    /// Called when a step completes, with a short summary
    fn on_step_complete(&self, step: RunStep, summary: &str);

    /// Called when a step fails
    fn on_step_failed(&self, _step: RunStep, _error: &str) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_step_start(&self, _step: RunStep) {}
    fn on_step_complete(&self, _step: RunStep, _summary: &str) {}
}
