//! Test data factories for assemble types

#![allow(dead_code)]

use super::mock_git::MockGit;
use super::mock_platform::{MockFactory, MockPlatformService};
use assemble::auth::CredentialStore;
use assemble::config::{DEFAULT_FEATURE_PATH, DEFAULT_PR_TITLE, SubmitSettings};
use assemble::submit::{SubmissionTracker, Submitter};
use assemble::types::{Credentials, RepoSpec};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Settings targeting `ballet/demo` with working copies under `work_dir`
pub fn make_settings(work_dir: &Path) -> SubmitSettings {
    SubmitSettings {
        upstream: RepoSpec::new("ballet", "demo"),
        work_dir: work_dir.to_path_buf(),
        feature_path: DEFAULT_FEATURE_PATH.to_string(),
        pr_title: DEFAULT_PR_TITLE.to_string(),
        remote_timeout: Duration::from_secs(5),
        fork_poll_attempts: 3,
        fork_poll_interval: Duration::from_millis(1),
    }
}

/// Credentials as stored after a successful exchange
pub fn make_credentials(token: &str) -> Credentials {
    Credentials::authenticated(token.to_string(), vec!["repo".into(), "gist".into()], "bearer".into())
}

/// A submitter wired to mocks, with handles to inspect them
pub struct Harness {
    pub submitter: Arc<Submitter>,
    pub platform: Arc<MockPlatformService>,
    pub factory: Arc<MockFactory>,
    pub git: Arc<MockGit>,
    pub credentials: Arc<CredentialStore>,
    pub tracker: Arc<SubmissionTracker>,
}

impl Harness {
    /// Authenticated harness with working copies under `work_dir`
    pub fn new(work_dir: &Path) -> Self {
        let harness = Self::unauthenticated(work_dir);
        harness.credentials.replace(make_credentials("tok-123"));
        harness
    }

    /// Harness whose credential store is empty
    pub fn unauthenticated(work_dir: &Path) -> Self {
        Self::with_settings(make_settings(work_dir))
    }

    pub fn with_settings(settings: SubmitSettings) -> Self {
        let platform = Arc::new(MockPlatformService::new());
        let factory = Arc::new(MockFactory::new(platform.clone()));
        let git = Arc::new(MockGit::new());
        let credentials = Arc::new(CredentialStore::new());
        let tracker = Arc::new(SubmissionTracker::new());
        let submitter = Arc::new(Submitter::new(
            settings,
            credentials.clone(),
            tracker.clone(),
            factory.clone(),
            git.clone(),
        ));
        Self {
            submitter,
            platform,
            factory,
            git,
            credentials,
            tracker,
        }
    }
}
