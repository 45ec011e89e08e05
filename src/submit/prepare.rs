//! Repository preparation: fork and local working copy

use crate::config::SubmitSettings;
use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::repo::{CommitIdentity, GitAuth, GitBackend};
use crate::submit::{StepProgress, bounded};
use crate::types::{Identity, RepoSpec, RepositoryHandle, RepositoryInfo, Step};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Ensures a fork and an up-to-date working copy of it exist
pub struct RepositoryPreparer<'a> {
    platform: &'a dyn PlatformService,
    git: &'a dyn GitBackend,
    settings: &'a SubmitSettings,
    auth: GitAuth,
}

impl<'a> RepositoryPreparer<'a> {
    /// Create a preparer
    pub const fn new(
        platform: &'a dyn PlatformService,
        git: &'a dyn GitBackend,
        settings: &'a SubmitSettings,
        auth: GitAuth,
    ) -> Self {
        Self {
            platform,
            git,
            settings,
            auth,
        }
    }

    /// Fork `upstream` under `identity`, reusing an existing fork
    ///
    /// Marks [`Step::Fork`].
    pub async fn ensure_fork(
        &self,
        upstream: &RepoSpec,
        identity: &Identity,
        progress: &mut StepProgress<'_>,
    ) -> Result<RepositoryHandle> {
        let limit = self.settings.remote_timeout;

        let upstream_info = bounded("upstream lookup", limit, self.platform.get_repository(upstream))
            .await
            .map_err(|e| {
                Error::RepositoryPrep(format!("could not read {upstream}: {}", e.detail()))
            })?;

        let requested = bounded("fork", limit, self.platform.create_fork(upstream))
            .await
            .map_err(|e| {
                Error::RepositoryPrep(format!(
                    "could not fork {upstream} for {}: {}",
                    identity.login,
                    e.detail()
                ))
            })?;

        let fork = self.wait_for_fork(&requested).await?;
        info!(upstream = %upstream, fork = %fork.spec, "fork ready");
        progress.complete(Step::Fork)?;

        Ok(RepositoryHandle {
            upstream: upstream_info,
            fork,
            local_path: None,
        })
    }

    /// Poll until the fork's metadata is served
    ///
    /// GitHub creates forks asynchronously; the fork call can return before
    /// the repository is readable.
    async fn wait_for_fork(&self, fork: &RepositoryInfo) -> Result<RepositoryInfo> {
        let attempts = self.settings.fork_poll_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            match bounded(
                "fork lookup",
                self.settings.remote_timeout,
                self.platform.get_repository(&fork.spec),
            )
            .await
            {
                Ok(info) => return Ok(info),
                Err(e) => {
                    debug!(fork = %fork.spec, attempt, error = %e, "fork not available yet");
                    last_error = Some(e);
                }
            }
            if attempt < attempts {
                tokio::time::sleep(self.settings.fork_poll_interval).await;
            }
        }

        Err(Error::RepositoryPrep(format!(
            "fork {} did not become available: {}",
            fork.spec,
            last_error.map(|e| e.detail()).unwrap_or_default()
        )))
    }

    /// Working copy location for a fork
    pub fn local_path(&self, fork: &RepoSpec) -> PathBuf {
        self.settings.work_dir.join(&fork.owner).join(&fork.name)
    }

    /// Clone the fork, or fetch and fast-forward an existing working copy,
    /// then configure it for committing as `identity`
    ///
    /// Marks [`Step::Clone`] and [`Step::Configure`]. A failed clone removes
    /// the directory it was cloning into.
    pub async fn ensure_local_clone(
        &self,
        handle: &mut RepositoryHandle,
        identity: &Identity,
        progress: &mut StepProgress<'_>,
    ) -> Result<()> {
        let dest = self.local_path(&handle.fork.spec);

        if dest.join(".git").is_dir() {
            self.update(&dest, &handle.fork).await?;
        } else if dest.exists() {
            return Err(Error::RepositoryPrep(format!(
                "{} exists but is not a git working copy",
                dest.display()
            )));
        } else {
            self.clone_into(&dest, &handle.fork).await?;
        }
        handle.local_path = Some(dest.clone());
        progress.complete(Step::Clone)?;

        let commit_identity = CommitIdentity {
            name: identity.login.clone(),
            email: identity.noreply_email(),
        };
        self.git
            .configure(
                &dest,
                &commit_identity,
                &handle.fork.clone_url,
                &handle.upstream.clone_url,
            )
            .await
            .map_err(|e| {
                Error::RepositoryPrep(format!(
                    "could not configure {}: {}",
                    dest.display(),
                    e.detail()
                ))
            })?;
        progress.complete(Step::Configure)?;

        Ok(())
    }

    async fn update(&self, dest: &Path, fork: &RepositoryInfo) -> Result<()> {
        debug!(path = %dest.display(), "updating existing working copy");
        let result = async {
            self.git.fetch(dest, "origin", &self.auth).await?;
            self.git
                .fast_forward(dest, "origin", &fork.default_branch)
                .await
        }
        .await;

        result.map_err(|e| {
            Error::RepositoryPrep(format!(
                "could not update {}: {}",
                dest.display(),
                e.detail()
            ))
        })
    }

    async fn clone_into(&self, dest: &Path, fork: &RepositoryInfo) -> Result<()> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::RepositoryPrep(format!("could not create {}: {e}", parent.display()))
            })?;
        }

        debug!(fork = %fork.spec, path = %dest.display(), "cloning fork");
        if let Err(e) = self.git.clone_repo(&fork.clone_url, dest, &self.auth).await {
            if dest.exists() {
                if let Err(cleanup) = tokio::fs::remove_dir_all(dest).await {
                    warn!(path = %dest.display(), error = %cleanup, "could not remove partial clone");
                }
            }
            return Err(Error::RepositoryPrep(format!(
                "could not clone {}: {}",
                fork.spec,
                e.detail()
            )));
        }
        Ok(())
    }
}
