//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{Identity, PullRequest, RepoSpec, RepositoryInfo};
use async_trait::async_trait;
use octocrab::Octocrab;
use octocrab::models::Repository;
use tracing::debug;

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
}

impl GitHubService {
    /// Create a new GitHub service authenticated with `token`
    ///
    /// `api_base` points at a GitHub Enterprise API root
    /// (`https://host/api/v3`); `None` uses api.github.com.
    pub fn new(token: &str, api_base: Option<&str>) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());

        if let Some(base_url) = api_base {
            builder = builder
                .base_uri(base_url)
                .map_err(|e| Error::GitHubApi(e.to_string()))?;
        }

        let client = builder.build().map_err(|e| Error::GitHubApi(e.to_string()))?;

        Ok(Self { client })
    }
}

fn repository_info(repo: &Repository, fallback: &RepoSpec) -> RepositoryInfo {
    let owner = repo
        .owner
        .as_ref()
        .map_or_else(|| fallback.owner.clone(), |o| o.login.clone());
    let spec = RepoSpec::new(owner, repo.name.clone());
    let clone_url = repo
        .clone_url
        .as_ref()
        .map_or_else(|| format!("https://github.com/{spec}.git"), ToString::to_string);

    RepositoryInfo {
        spec,
        clone_url,
        default_branch: repo
            .default_branch
            .clone()
            .unwrap_or_else(|| "main".to_string()),
    }
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn current_user(&self) -> Result<Identity> {
        let user = self.client.current().user().await?;
        Ok(Identity {
            login: user.login,
            id: user.id.0,
        })
    }

    async fn get_repository(&self, repo: &RepoSpec) -> Result<RepositoryInfo> {
        let found = self.client.repos(&repo.owner, &repo.name).get().await?;
        Ok(repository_info(&found, repo))
    }

    async fn create_fork(&self, repo: &RepoSpec) -> Result<RepositoryInfo> {
        debug!(upstream = %repo, "requesting fork");
        let fork = self
            .client
            .repos(&repo.owner, &repo.name)
            .create_fork()
            .send()
            .await?;
        Ok(repository_info(&fork, repo))
    }

    async fn create_pr(
        &self,
        repo: &RepoSpec,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequest> {
        let pr = self
            .client
            .pulls(&repo.owner, &repo.name)
            .create(title, head, base)
            .body(body)
            .send()
            .await?;

        Ok(PullRequest {
            number: pr.number,
            html_url: pr
                .html_url
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            base_ref: pr.base.ref_field.clone(),
            head_ref: pr.head.ref_field.clone(),
            title: pr.title.as_deref().unwrap_or_default().to_string(),
        })
    }
}
