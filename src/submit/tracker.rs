//! Latest-submission tracker

use crate::types::{SubmissionResult, SubmissionState};
use std::sync::{PoisonError, RwLock};

/// Holds the single most recent submission, superseded by the next one
#[derive(Debug, Default)]
pub struct SubmissionTracker {
    latest: RwLock<Option<SubmissionResult>>,
}

impl SubmissionTracker {
    /// Tracker with no submission recorded
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the state of a running submission
    pub fn record_progress(&self, state: SubmissionState) {
        self.store(SubmissionResult::in_progress(state));
    }

    /// Publish a finished submission
    pub fn record_result(&self, result: SubmissionResult) {
        self.store(result);
    }

    /// State of the latest submission, if any has run
    pub fn current_state(&self) -> Option<SubmissionState> {
        self.read().map(|r| r.state)
    }

    /// Latest submission, finished or in progress
    pub fn latest(&self) -> Option<SubmissionResult> {
        self.read()
    }

    fn read(&self) -> Option<SubmissionResult> {
        self.latest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store(&self, result: SubmissionResult) {
        *self.latest.write().unwrap_or_else(PoisonError::into_inner) = Some(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::Step;

    #[test]
    fn test_empty_before_any_submission() {
        let tracker = SubmissionTracker::new();
        assert!(tracker.current_state().is_none());
        assert!(tracker.latest().is_none());
    }

    #[test]
    fn test_result_supersedes_previous() {
        let tracker = SubmissionTracker::new();
        let mut state = SubmissionState::default();
        state.mark(Step::Load).unwrap();
        tracker.record_result(SubmissionResult::failed(
            &Error::Validation("empty".into()),
            state,
        ));

        tracker.record_progress(SubmissionState::default());
        let latest = tracker.latest().unwrap();
        assert!(!latest.is_finished());
        assert_eq!(latest.state, SubmissionState::default());
    }
}
