//! Mock platform service for testing

#![allow(dead_code)]

use assemble::error::{Error, Result};
use assemble::platform::{PlatformFactory, PlatformService};
use assemble::types::{Credentials, Identity, PullRequest, RepoSpec, RepositoryInfo};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Call record for `create_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePrCall {
    pub repo: RepoSpec,
    pub head: String,
    pub base: String,
    pub title: String,
    pub body: String,
}

type Hook = Box<dyn Fn() + Send + Sync>;

/// Simple mock platform service for testing
///
/// Features:
/// - Fixed identity and upstream repository
/// - Forks that become readable after a configurable number of polls
/// - Call tracking for verification
/// - Error injection for failure path testing
/// - Per-call delays for timeout testing
pub struct MockPlatformService {
    identity: Identity,
    upstream: RepositoryInfo,
    next_pr_number: AtomicU64,
    fork_hidden_polls: AtomicU32,
    pr_url: Mutex<Option<String>>,
    on_create_pr: Mutex<Option<Hook>>,
    delays: Mutex<HashMap<&'static str, Duration>>,
    // Call tracking
    get_repository_calls: Mutex<Vec<RepoSpec>>,
    create_fork_calls: Mutex<Vec<RepoSpec>>,
    create_pr_calls: Mutex<Vec<CreatePrCall>>,
    // Error injection
    error_on_current_user: Mutex<Option<String>>,
    error_on_create_fork: Mutex<Option<String>>,
    error_on_create_pr: Mutex<Option<String>>,
}

impl MockPlatformService {
    /// Mock authenticated as `octo` (id 42) with upstream `ballet/demo`
    pub fn new() -> Self {
        Self {
            identity: Identity {
                login: "octo".to_string(),
                id: 42,
            },
            upstream: repo_info("ballet", "demo", "main"),
            next_pr_number: AtomicU64::new(1),
            fork_hidden_polls: AtomicU32::new(0),
            pr_url: Mutex::new(None),
            on_create_pr: Mutex::new(None),
            delays: Mutex::new(HashMap::new()),
            get_repository_calls: Mutex::new(Vec::new()),
            create_fork_calls: Mutex::new(Vec::new()),
            create_pr_calls: Mutex::new(Vec::new()),
            error_on_current_user: Mutex::new(None),
            error_on_create_fork: Mutex::new(None),
            error_on_create_pr: Mutex::new(None),
        }
    }

    /// The fork's metadata is not served for the first `polls` lookups
    pub fn hide_fork_for(&self, polls: u32) {
        self.fork_hidden_polls.store(polls, Ordering::SeqCst);
    }

    /// Override the URL returned for created PRs
    pub fn set_pr_url(&self, url: &str) {
        *self.pr_url.lock().unwrap() = Some(url.to_string());
    }

    /// Run `hook` inside `create_pr`, before it responds
    pub fn on_create_pr(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.on_create_pr.lock().unwrap() = Some(Box::new(hook));
    }

    /// Make call `op` (`current_user`, `get_repository`, `create_fork` or
    /// `create_pr`) take `duration` before responding
    pub fn delay(&self, op: &'static str, duration: Duration) {
        self.delays.lock().unwrap().insert(op, duration);
    }

    async fn pause(&self, op: &str) {
        let delay = self.delays.lock().unwrap().get(op).copied();
        if let Some(duration) = delay {
            tokio::time::sleep(duration).await;
        }
    }

    // === Error injection methods ===

    /// Make `current_user` return an error
    pub fn fail_current_user(&self, msg: &str) {
        *self.error_on_current_user.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `create_fork` return an error
    pub fn fail_create_fork(&self, msg: &str) {
        *self.error_on_create_fork.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `create_pr` return an error
    pub fn fail_create_pr(&self, msg: &str) {
        *self.error_on_create_pr.lock().unwrap() = Some(msg.to_string());
    }

    // === Call verification methods ===

    /// Get all `get_repository` calls
    pub fn get_repository_calls(&self) -> Vec<RepoSpec> {
        self.get_repository_calls.lock().unwrap().clone()
    }

    /// Get all `create_fork` calls
    pub fn get_create_fork_calls(&self) -> Vec<RepoSpec> {
        self.create_fork_calls.lock().unwrap().clone()
    }

    /// Get all `create_pr` calls
    pub fn get_create_pr_calls(&self) -> Vec<CreatePrCall> {
        self.create_pr_calls.lock().unwrap().clone()
    }

    /// Whether any remote call was made
    pub fn was_called(&self) -> bool {
        !self.get_repository_calls().is_empty()
            || !self.get_create_fork_calls().is_empty()
            || !self.get_create_pr_calls().is_empty()
    }

    fn fork_info(&self) -> RepositoryInfo {
        repo_info(&self.identity.login, &self.upstream.spec.name, "main")
    }
}

/// Repository metadata served by the mock
pub fn repo_info(owner: &str, name: &str, default_branch: &str) -> RepositoryInfo {
    RepositoryInfo {
        spec: RepoSpec::new(owner, name),
        clone_url: format!("https://github.com/{owner}/{name}.git"),
        default_branch: default_branch.to_string(),
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn current_user(&self) -> Result<Identity> {
        self.pause("current_user").await;
        if let Some(msg) = self.error_on_current_user.lock().unwrap().clone() {
            return Err(Error::GitHubApi(msg));
        }
        Ok(self.identity.clone())
    }

    async fn get_repository(&self, repo: &RepoSpec) -> Result<RepositoryInfo> {
        self.get_repository_calls.lock().unwrap().push(repo.clone());
        self.pause("get_repository").await;

        if *repo == self.upstream.spec {
            return Ok(self.upstream.clone());
        }
        if *repo == self.fork_info().spec {
            let hidden = self.fork_hidden_polls.load(Ordering::SeqCst);
            if hidden > 0 {
                self.fork_hidden_polls.store(hidden - 1, Ordering::SeqCst);
                return Err(Error::GitHubApi("Not Found".to_string()));
            }
            return Ok(self.fork_info());
        }
        Err(Error::GitHubApi("Not Found".to_string()))
    }

    async fn create_fork(&self, repo: &RepoSpec) -> Result<RepositoryInfo> {
        self.create_fork_calls.lock().unwrap().push(repo.clone());
        self.pause("create_fork").await;
        if let Some(msg) = self.error_on_create_fork.lock().unwrap().clone() {
            return Err(Error::GitHubApi(msg));
        }
        Ok(self.fork_info())
    }

    async fn create_pr(
        &self,
        repo: &RepoSpec,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequest> {
        if let Some(hook) = self.on_create_pr.lock().unwrap().as_ref() {
            hook();
        }
        self.create_pr_calls.lock().unwrap().push(CreatePrCall {
            repo: repo.clone(),
            head: head.to_string(),
            base: base.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        });

        self.pause("create_pr").await;
        if let Some(msg) = self.error_on_create_pr.lock().unwrap().clone() {
            return Err(Error::GitHubApi(msg));
        }

        let number = self.next_pr_number.fetch_add(1, Ordering::SeqCst);
        let html_url = self
            .pr_url
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| format!("https://github.com/{repo}/pull/{number}"));
        Ok(PullRequest {
            number,
            html_url,
            base_ref: base.to_string(),
            head_ref: head.to_string(),
            title: title.to_string(),
        })
    }
}

/// Factory handing out one shared mock, recording the tokens it was given
pub struct MockFactory {
    platform: Arc<MockPlatformService>,
    tokens: Mutex<Vec<String>>,
}

impl MockFactory {
    pub fn new(platform: Arc<MockPlatformService>) -> Self {
        Self {
            platform,
            tokens: Mutex::new(Vec::new()),
        }
    }

    /// Tokens services were connected with
    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }
}

impl PlatformFactory for MockFactory {
    fn connect(&self, credentials: &Credentials) -> Result<Arc<dyn PlatformService>> {
        self.tokens.lock().unwrap().push(credentials.token.clone());
        let platform: Arc<dyn PlatformService> = self.platform.clone();
        Ok(platform)
    }
}
