//! Feature branch, write, commit and push

use crate::config::SubmitSettings;
use crate::error::{Error, Result};
use crate::repo::{GitAuth, GitBackend};
use crate::submit::StepProgress;
use crate::types::{FeatureBranch, Identity, RepositoryHandle, Step};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// Reject content with nothing to submit
pub fn validate_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(Error::Validation(
            "code content is empty - select a cell with code to submit".to_string(),
        ));
    }
    Ok(())
}

/// Unique per-submission stamp used for branch and file names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionStamp {
    timestamp: String,
    suffix: String,
}

impl SubmissionStamp {
    /// Stamp for the current time with a random suffix
    pub fn now() -> Self {
        Self::at(Utc::now(), &Uuid::new_v4().simple().to_string()[..6])
    }

    /// Stamp for a fixed time and suffix
    pub fn at(time: DateTime<Utc>, suffix: &str) -> Self {
        Self {
            timestamp: time.format("%Y%m%d%H%M%S").to_string(),
            suffix: suffix.to_string(),
        }
    }

    /// `submit-feature-<timestamp>-<suffix>`
    pub fn branch_name(&self) -> String {
        format!("submit-feature-{}-{}", self.timestamp, self.suffix)
    }

    /// `<timestamp>_<suffix>`, safe inside identifiers and file names
    pub fn file_stamp(&self) -> String {
        format!("{}_{}", self.timestamp, self.suffix)
    }
}

/// Render the feature path template for `login` and `stamp`
pub(crate) fn feature_path(template: &str, login: &str, stamp: &SubmissionStamp) -> PathBuf {
    let user: String = login
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    PathBuf::from(
        template
            .replace("{user}", &user)
            .replace("{stamp}", &stamp.file_stamp()),
    )
}

/// Creates the feature branch and lands the submitted content on it
pub struct FeatureEngine<'a> {
    git: &'a dyn GitBackend,
    settings: &'a SubmitSettings,
    auth: GitAuth,
}

impl<'a> FeatureEngine<'a> {
    /// Create an engine
    pub const fn new(git: &'a dyn GitBackend, settings: &'a SubmitSettings, auth: GitAuth) -> Self {
        Self {
            git,
            settings,
            auth,
        }
    }

    /// Create a uniquely named branch from the fork's default branch tip
    /// and prepare the feature file's directory
    ///
    /// Marks [`Step::Branch`] and [`Step::Feature`].
    pub async fn create_feature_branch(
        &self,
        handle: &RepositoryHandle,
        identity: &Identity,
        progress: &mut StepProgress<'_>,
    ) -> Result<FeatureBranch> {
        self.create_feature_branch_with(handle, identity, &SubmissionStamp::now(), progress)
            .await
    }

    /// [`Self::create_feature_branch`] with an explicit stamp
    pub async fn create_feature_branch_with(
        &self,
        handle: &RepositoryHandle,
        identity: &Identity,
        stamp: &SubmissionStamp,
        progress: &mut StepProgress<'_>,
    ) -> Result<FeatureBranch> {
        let repo = working_copy(handle)?;
        let name = stamp.branch_name();
        let start_point = format!("origin/{}", handle.fork.default_branch);

        self.git
            .create_branch(repo, &name, &start_point)
            .await
            .map_err(|e| {
                Error::GitOperation(format!("could not create branch {name}: {}", e.detail()))
            })?;
        progress.complete(Step::Branch)?;

        let file_path = feature_path(&self.settings.feature_path, &identity.login, stamp);
        if let Some(dir) = file_path.parent() {
            tokio::fs::create_dir_all(repo.join(dir)).await.map_err(|e| {
                Error::GitOperation(format!("could not create {}: {e}", dir.display()))
            })?;
        }
        debug!(branch = %name, path = %file_path.display(), "feature prepared");
        progress.complete(Step::Feature)?;

        Ok(FeatureBranch { name, file_path })
    }

    /// Write the submitted content into the feature file
    ///
    /// Marks [`Step::Write`].
    pub async fn write_content(
        &self,
        handle: &RepositoryHandle,
        branch: &FeatureBranch,
        content: &str,
        progress: &mut StepProgress<'_>,
    ) -> Result<()> {
        let path = working_copy(handle)?.join(&branch.file_path);
        tokio::fs::write(&path, content).await.map_err(|e| {
            Error::GitOperation(format!("could not write {}: {e}", branch.file_path.display()))
        })?;
        progress.complete(Step::Write)
    }

    /// Commit the feature file and push the branch to the fork
    ///
    /// Marks [`Step::Commit`] and [`Step::Push`], each only after the git
    /// call succeeds. A commit that fails to push is left in place.
    pub async fn commit_and_push(
        &self,
        handle: &RepositoryHandle,
        branch: &FeatureBranch,
        progress: &mut StepProgress<'_>,
    ) -> Result<()> {
        let repo = working_copy(handle)?;
        let message = format!("Add feature {}", branch.file_path.display());

        self.git
            .commit(repo, std::slice::from_ref(&branch.file_path), &message)
            .await
            .map_err(|e| Error::GitOperation(format!("could not commit: {}", e.detail())))?;
        progress.complete(Step::Commit)?;

        self.git
            .push(repo, "origin", &branch.name, &self.auth)
            .await
            .map_err(|e| {
                Error::GitOperation(format!(
                    "could not push {} to {}: {}",
                    branch.name,
                    handle.fork.spec,
                    e.detail()
                ))
            })?;
        progress.complete(Step::Push)
    }
}

fn working_copy(handle: &RepositoryHandle) -> Result<&Path> {
    handle
        .local_path
        .as_deref()
        .ok_or_else(|| Error::Internal("working copy has not been prepared".to_string()))
}
