//! Submission pipeline
//!
//! Turns a snippet of code into a pull request:
//! 1. Preparation - fork the upstream repository and sync a working copy
//! 2. Feature - branch, write, commit and push the snippet
//! 3. Proposal - open the pull request upstream
//!
//! Every completed step is published to the [`SubmissionTracker`] so a
//! caller can poll progress while the submission runs.

mod execute;
mod feature;
mod prepare;
mod progress;
mod tracker;

pub use execute::Submitter;
pub use feature::{FeatureEngine, SubmissionStamp, validate_content};
pub use prepare::RepositoryPreparer;
pub use progress::StepProgress;
pub use tracker::SubmissionTracker;

use crate::error::{Error, Result};
use std::future::Future;
use std::time::Duration;

/// Await `fut`, failing with [`Error::Timeout`] after `limit`
pub(crate) async fn bounded<T>(
    what: &str,
    limit: Duration,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| Error::Timeout(what.to_string(), limit))?
}
