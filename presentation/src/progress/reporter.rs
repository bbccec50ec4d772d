//! Progress reporting for assignment runs

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use leadflow_application::{ProgressNotifier, RunStep};
use std::sync::Mutex;
use std::time::Duration;

/// Reports progress with a spinner per step
pub struct ProgressReporter {
    current: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn step_display_name(step: RunStep) -> &'static str {
        match step {
            RunStep::Load => "Loading leads",
            RunStep::Allocate => "Allocating",
            RunStep::Persist => "Saving assignments",
            RunStep::ProjectDeals => "Creating deals",
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_step_start(&self, step: RunStep) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_prefix(Self::step_display_name(step));
        pb.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut current) = self.current.lock()
            && let Some(previous) = current.replace(pb)
        {
            previous.finish_and_clear();
        }
    }

    fn on_step_complete(&self, _step: RunStep, summary: &str) {
        if let Ok(mut current) = self.current.lock()
            && let Some(pb) = current.take()
        {
            pb.finish_with_message(format!("{} {}", "v".green(), summary));
        }
    }

    fn on_step_failed(&self, step: RunStep, error: &str) {
        if let Ok(mut current) = self.current.lock()
            && let Some(pb) = current.take()
        {
            pb.abandon_with_message(format!(
                "{} {} failed: {}",
                "x".red(),
                Self::step_display_name(step),
                error
            ));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_step_start(&self, step: RunStep) {
        eprintln!(
            "{} {}",
            "->".cyan(),
            ProgressReporter::step_display_name(step).bold()
        );
    }

    fn on_step_complete(&self, _step: RunStep, summary: &str) {
        eprintln!("  {} {}", "v".green(), summary);
    }

    fn on_step_failed(&self, step: RunStep, error: &str) {
        eprintln!("  {} {} failed: {}", "x".red(), step.as_str(), error);
    }
}
