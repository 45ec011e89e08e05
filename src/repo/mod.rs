//! Local working copy operations
//!
//! The submission pipeline drives git through [`GitBackend`]; [`GitCli`]
//! implements it with the `git` executable.

mod git;

pub use git::GitCli;

use crate::error::Result;
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use std::fmt;
use std::path::{Path, PathBuf};

/// HTTPS credentials for fetch and push
#[derive(Clone)]
pub struct GitAuth {
    token: String,
}

impl GitAuth {
    /// Authenticate with a GitHub token
    pub const fn token(token: String) -> Self {
        Self { token }
    }

    /// Value for git's `http.extraHeader`
    pub fn header(&self) -> String {
        let basic = BASE64.encode(format!("x-access-token:{}", self.token));
        format!("AUTHORIZATION: basic {basic}")
    }
}

impl fmt::Debug for GitAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GitAuth(<redacted>)")
    }
}

/// Author identity written into the working copy's config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitIdentity {
    /// `user.name`
    pub name: String,
    /// `user.email`
    pub email: String,
}

/// Git operations on a local working copy
#[async_trait]
pub trait GitBackend: Send + Sync {
    /// Clone `url` into `dest`
    async fn clone_repo(&self, url: &str, dest: &Path, auth: &GitAuth) -> Result<()>;

    /// Fetch `remote`
    async fn fetch(&self, repo: &Path, remote: &str, auth: &GitAuth) -> Result<()>;

    /// Discard uncommitted changes, check out `branch` and fast-forward it
    /// to `remote/branch`
    async fn fast_forward(&self, repo: &Path, remote: &str, branch: &str) -> Result<()>;

    /// Set the commit identity, `origin` URL and `upstream` remote
    async fn configure(
        &self,
        repo: &Path,
        identity: &CommitIdentity,
        origin_url: &str,
        upstream_url: &str,
    ) -> Result<()>;

    /// Create and check out `branch` at `start_point`
    async fn create_branch(&self, repo: &Path, branch: &str, start_point: &str) -> Result<()>;

    /// Stage `paths` and commit them, and nothing else in the index
    async fn commit(&self, repo: &Path, paths: &[PathBuf], message: &str) -> Result<()>;

    /// Push `branch` to `remote`
    async fn push(&self, repo: &Path, remote: &str, branch: &str, auth: &GitAuth) -> Result<()>;
}
