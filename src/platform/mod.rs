//! Platform services for GitHub
//!
//! Provides the hosting-provider operations the submission pipeline needs.

mod detection;
mod factory;
mod github;

pub use detection::parse_repo_spec;
pub use factory::{GitHubFactory, PlatformFactory};
pub use github::GitHubService;

use crate::error::Result;
use crate::types::{Identity, PullRequest, RepoSpec, RepositoryInfo};
use async_trait::async_trait;

/// Platform service trait for fork and PR operations
///
/// Abstracts the hosting provider so the submission pipeline can be driven
/// against GitHub or a test double.
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Account the service is authenticated as
    async fn current_user(&self) -> Result<Identity>;

    /// Fetch repository metadata
    async fn get_repository(&self, repo: &RepoSpec) -> Result<RepositoryInfo>;

    /// Fork `repo` into the authenticated account
    ///
    /// Succeeds with the existing fork when one already exists.
    async fn create_fork(&self, repo: &RepoSpec) -> Result<RepositoryInfo>;

    /// Open a pull request against `repo`
    async fn create_pr(
        &self,
        repo: &RepoSpec,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequest>;
}
