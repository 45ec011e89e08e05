//! Step-by-step progress of a running submission

use crate::error::Result;
use crate::submit::SubmissionTracker;
use crate::types::{Step, SubmissionState};
use tracing::info;

/// Records completed steps and publishes each one to the tracker
///
/// Creating a `StepProgress` publishes an empty state, superseding
/// whatever the tracker held from the previous submission.
pub struct StepProgress<'a> {
    state: SubmissionState,
    tracker: &'a SubmissionTracker,
}

impl<'a> StepProgress<'a> {
    /// Start tracking a new submission
    pub fn new(tracker: &'a SubmissionTracker) -> Self {
        let state = SubmissionState::default();
        tracker.record_progress(state);
        Self { state, tracker }
    }

    /// Mark `step` complete and publish the new state
    pub fn complete(&mut self, step: Step) -> Result<()> {
        self.state.mark(step)?;
        self.tracker.record_progress(self.state);
        info!(step = %step, "submission step complete");
        Ok(())
    }

    /// Current state
    pub const fn state(&self) -> SubmissionState {
        self.state
    }
}
