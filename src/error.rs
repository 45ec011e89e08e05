//! Error types for assemble

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while authenticating or submitting code
#[derive(Debug, Error)]
pub enum Error {
    /// Submitted content was rejected before any remote work
    #[error("invalid submission: {0}")]
    Validation(String),

    /// Submit was attempted without a GitHub token
    #[error("not authenticated with GitHub - authorize first")]
    AuthRequired,

    /// OAuth token exchange failed
    #[error("token exchange failed: {0}")]
    AuthExchange(String),

    /// Fork, clone or configure failed
    #[error("repository preparation failed: {0}")]
    RepositoryPrep(String),

    /// Branch, write, commit or push failed
    #[error("git operation failed: {0}")]
    GitOperation(String),

    /// The final pull request call failed
    #[error("pull request creation failed: {0}")]
    PullRequest(String),

    /// GitHub API call failed
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Remote call exceeded its time bound
    #[error("{0} timed out after {1:?}")]
    Timeout(String, Duration),

    /// Invalid or missing configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Could not parse a repository reference
    #[error("parse error: {0}")]
    Parse(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Broken internal invariant
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<octocrab::Error> for Error {
    fn from(err: octocrab::Error) -> Self {
        match &err {
            octocrab::Error::GitHub { source, .. } => Self::GitHubApi(source.message.clone()),
            _ => Self::GitHubApi(err.to_string()),
        }
    }
}

/// Failure category reported alongside a failed submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Empty or whitespace-only content
    Validation,
    /// Submit attempted before authentication
    AuthRequired,
    /// OAuth exchange failed
    AuthExchange,
    /// Fork/clone/configure failed
    RepositoryPrep,
    /// Branch/write/commit/push failed
    GitOperation,
    /// Pull request creation failed
    PullRequest,
}

impl Error {
    /// Category of this error, if it belongs to the submission taxonomy
    ///
    /// Plumbing errors (HTTP, IO, timeouts) return `None`; callers classify
    /// them by the step that was running.
    pub const fn kind(&self) -> Option<FailureKind> {
        match self {
            Self::Validation(_) => Some(FailureKind::Validation),
            Self::AuthRequired => Some(FailureKind::AuthRequired),
            Self::AuthExchange(_) => Some(FailureKind::AuthExchange),
            Self::RepositoryPrep(_) => Some(FailureKind::RepositoryPrep),
            Self::GitOperation(_) => Some(FailureKind::GitOperation),
            Self::PullRequest(_) => Some(FailureKind::PullRequest),
            _ => None,
        }
    }

    /// Message without the category prefix, for wrapping in a new context
    pub fn detail(&self) -> String {
        match self {
            Self::Validation(m)
            | Self::AuthExchange(m)
            | Self::RepositoryPrep(m)
            | Self::GitOperation(m)
            | Self::PullRequest(m)
            | Self::GitHubApi(m) => m.clone(),
            other => other.to_string(),
        }
    }
}
