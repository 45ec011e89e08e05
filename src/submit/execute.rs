//! Submission execution
//!
//! Runs the pipeline end to end: validate, fork, clone, configure, branch,
//! write, commit, push and open the pull request.

use crate::auth::CredentialStore;
use crate::config::SubmitSettings;
use crate::error::{Error, Result};
use crate::platform::PlatformFactory;
use crate::repo::{GitAuth, GitBackend};
use crate::submit::{
    FeatureEngine, RepositoryPreparer, StepProgress, SubmissionTracker, bounded, validate_content,
};
use crate::types::{
    FeatureBranch, Identity, PullRequest, RepositoryHandle, Step, SubmissionResult, SubmissionState,
};
use std::fmt::Write;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Submits code snippets as pull requests
///
/// Submissions run one at a time; a second call waits until the first
/// finishes. Progress and the final outcome are published to the tracker.
pub struct Submitter {
    settings: SubmitSettings,
    credentials: Arc<CredentialStore>,
    tracker: Arc<SubmissionTracker>,
    platforms: Arc<dyn PlatformFactory>,
    git: Arc<dyn GitBackend>,
    lock: Mutex<()>,
}

impl Submitter {
    /// Create a submitter
    pub fn new(
        settings: SubmitSettings,
        credentials: Arc<CredentialStore>,
        tracker: Arc<SubmissionTracker>,
        platforms: Arc<dyn PlatformFactory>,
        git: Arc<dyn GitBackend>,
    ) -> Self {
        Self {
            settings,
            credentials,
            tracker,
            platforms,
            git,
            lock: Mutex::new(()),
        }
    }

    /// Submit `content`, returning the outcome
    ///
    /// Never fails: errors are reported in the result together with the
    /// steps that completed before them.
    pub async fn submit(&self, content: &str) -> SubmissionResult {
        let _guard = self.lock.lock().await;
        let mut progress = StepProgress::new(&self.tracker);

        let result = match self.run(content, &mut progress).await {
            Ok(pr) => {
                info!(
                    url = %pr.html_url,
                    number = pr.number,
                    head = %pr.head_ref,
                    base = %pr.base_ref,
                    title = %pr.title,
                    "submission complete"
                );
                SubmissionResult::succeeded(pr.html_url, progress.state())
            }
            Err(e) => {
                let state = progress.state();
                warn!(
                    error = %e,
                    failed_step = ?state.first_incomplete(),
                    "submission failed"
                );
                SubmissionResult::failed(&e, state)
            }
        };

        self.tracker.record_result(result.clone());
        result
    }

    /// Start a submission on its own task and return without waiting
    ///
    /// The tracker is reset to an empty in-progress snapshot before this
    /// returns, so a poll that follows never sees the previous outcome.
    /// Dropping the handle detaches the task; it still runs to completion.
    pub fn start(self: &Arc<Self>, content: String) -> JoinHandle<SubmissionResult> {
        self.tracker.record_progress(SubmissionState::default());
        let submitter = Arc::clone(self);
        tokio::spawn(async move { submitter.submit(&content).await })
    }

    async fn run(&self, content: &str, progress: &mut StepProgress<'_>) -> Result<PullRequest> {
        progress.complete(Step::Load)?;
        validate_content(content)?;
        progress.complete(Step::Check)?;

        let credentials = self.credentials.snapshot();
        if !credentials.authenticated {
            return Err(Error::AuthRequired);
        }

        let limit = self.settings.remote_timeout;
        let platform = self.platforms.connect(&credentials)?;
        let identity = bounded("user lookup", limit, platform.current_user())
            .await
            .map_err(|e| {
                Error::RepositoryPrep(format!(
                    "could not identify the authenticated user: {}",
                    e.detail()
                ))
            })?;
        let auth = GitAuth::token(credentials.token);

        let preparer =
            RepositoryPreparer::new(platform.as_ref(), self.git.as_ref(), &self.settings, auth.clone());
        let mut handle = preparer
            .ensure_fork(&self.settings.upstream, &identity, progress)
            .await?;
        preparer
            .ensure_local_clone(&mut handle, &identity, progress)
            .await?;

        let engine = FeatureEngine::new(self.git.as_ref(), &self.settings, auth);
        let branch = engine
            .create_feature_branch(&handle, &identity, progress)
            .await?;
        engine
            .write_content(&handle, &branch, content, progress)
            .await?;
        engine.commit_and_push(&handle, &branch, progress).await?;

        let head = format!("{}:{}", handle.fork.spec.owner, branch.name);
        let body = pr_body(&handle, &branch, &identity);
        let pr = bounded(
            "pull request",
            limit,
            platform.create_pr(
                &handle.upstream.spec,
                &head,
                &handle.upstream.default_branch,
                &self.settings.pr_title,
                &body,
            ),
        )
        .await
        .map_err(|e| {
            Error::PullRequest(format!(
                "could not open a pull request against {}: {}",
                handle.upstream.spec,
                e.detail()
            ))
        })?;

        if pr.html_url.is_empty() {
            return Err(Error::PullRequest(format!(
                "pull request #{} was created without a URL",
                pr.number
            )));
        }
        progress.complete(Step::PullRequest)?;
        Ok(pr)
    }
}

fn pr_body(handle: &RepositoryHandle, branch: &FeatureBranch, identity: &Identity) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "Adds a new feature submitted by @{}.", identity.login);
    let _ = writeln!(body);
    let _ = writeln!(body, "- File: `{}`", branch.file_path.display());
    let _ = writeln!(body, "- Branch: `{}:{}`", handle.fork.spec, branch.name);
    body
}
