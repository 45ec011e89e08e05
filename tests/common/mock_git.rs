//! Mock git backend for testing

#![allow(dead_code)]

use assemble::error::{Error, Result};
use assemble::repo::{CommitIdentity, GitAuth, GitBackend};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One recorded git operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCall {
    Clone { url: String, dest: PathBuf },
    Fetch { remote: String },
    FastForward { remote: String, branch: String },
    Configure {
        identity: CommitIdentity,
        origin_url: String,
        upstream_url: String,
    },
    CreateBranch { branch: String, start_point: String },
    Commit { paths: Vec<PathBuf>, message: String },
    Push { remote: String, branch: String },
}

impl GitCall {
    /// Operation name used for error injection
    pub const fn op(&self) -> &'static str {
        match self {
            Self::Clone { .. } => "clone",
            Self::Fetch { .. } => "fetch",
            Self::FastForward { .. } => "fast_forward",
            Self::Configure { .. } => "configure",
            Self::CreateBranch { .. } => "create_branch",
            Self::Commit { .. } => "commit",
            Self::Push { .. } => "push",
        }
    }
}

/// Git backend that records calls instead of running git
///
/// `clone_repo` creates `dest/.git` so later submissions see an existing
/// working copy. Any operation can be made to fail by name.
pub struct MockGit {
    calls: Mutex<Vec<GitCall>>,
    failures: Mutex<HashMap<&'static str, String>>,
    auth_headers: Mutex<Vec<String>>,
}

impl MockGit {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            auth_headers: Mutex::new(Vec::new()),
        }
    }

    /// Make operation `op` fail with `msg`
    ///
    /// A failing clone still creates its destination directory, like an
    /// interrupted `git clone`.
    pub fn fail(&self, op: &'static str, msg: &str) {
        self.failures.lock().unwrap().insert(op, msg.to_string());
    }

    /// Stop failing `op`
    pub fn heal(&self, op: &'static str) {
        self.failures.lock().unwrap().remove(op);
    }

    /// Every recorded call, in order
    pub fn calls(&self) -> Vec<GitCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Names of recorded operations, in order
    pub fn ops(&self) -> Vec<&'static str> {
        self.calls().iter().map(GitCall::op).collect()
    }

    /// `http.extraHeader` values passed to remote operations
    pub fn auth_headers(&self) -> Vec<String> {
        self.auth_headers.lock().unwrap().clone()
    }

    fn record(&self, call: GitCall) -> Result<()> {
        let op = call.op();
        self.calls.lock().unwrap().push(call);
        match self.failures.lock().unwrap().get(op) {
            Some(msg) => Err(Error::GitOperation(format!("git {op} failed: {msg}"))),
            None => Ok(()),
        }
    }

    fn record_auth(&self, auth: &GitAuth) {
        self.auth_headers.lock().unwrap().push(auth.header());
    }
}

#[async_trait]
impl GitBackend for MockGit {
    async fn clone_repo(&self, url: &str, dest: &Path, auth: &GitAuth) -> Result<()> {
        self.record_auth(auth);
        std::fs::create_dir_all(dest)?;
        self.record(GitCall::Clone {
            url: url.to_string(),
            dest: dest.to_path_buf(),
        })?;
        std::fs::create_dir_all(dest.join(".git"))?;
        Ok(())
    }

    async fn fetch(&self, _repo: &Path, remote: &str, auth: &GitAuth) -> Result<()> {
        self.record_auth(auth);
        self.record(GitCall::Fetch {
            remote: remote.to_string(),
        })
    }

    async fn fast_forward(&self, _repo: &Path, remote: &str, branch: &str) -> Result<()> {
        self.record(GitCall::FastForward {
            remote: remote.to_string(),
            branch: branch.to_string(),
        })
    }

    async fn configure(
        &self,
        _repo: &Path,
        identity: &CommitIdentity,
        origin_url: &str,
        upstream_url: &str,
    ) -> Result<()> {
        self.record(GitCall::Configure {
            identity: identity.clone(),
            origin_url: origin_url.to_string(),
            upstream_url: upstream_url.to_string(),
        })
    }

    async fn create_branch(&self, _repo: &Path, branch: &str, start_point: &str) -> Result<()> {
        self.record(GitCall::CreateBranch {
            branch: branch.to_string(),
            start_point: start_point.to_string(),
        })
    }

    async fn commit(&self, _repo: &Path, paths: &[PathBuf], message: &str) -> Result<()> {
        self.record(GitCall::Commit {
            paths: paths.to_vec(),
            message: message.to_string(),
        })
    }

    async fn push(&self, _repo: &Path, remote: &str, branch: &str, auth: &GitAuth) -> Result<()> {
        self.record_auth(auth);
        self.record(GitCall::Push {
            remote: remote.to_string(),
            branch: branch.to_string(),
        })
    }
}
