//! Core types for assemble

use crate::error::{Error, FailureKind, Result};
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// One step of the submission pipeline, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    /// Environment and configuration loaded
    Load,
    /// Submitted content validated
    Check,
    /// Fork exists under the submitter's account
    Fork,
    /// Local working copy cloned or updated
    Clone,
    /// Local identity and remotes configured
    Configure,
    /// Feature branch created and checked out
    Branch,
    /// Feature file location prepared
    Feature,
    /// Content written to the feature file
    Write,
    /// Change committed
    Commit,
    /// Branch pushed to the fork
    Push,
    /// Pull request opened upstream
    PullRequest,
}

impl Step {
    /// Number of steps
    pub const COUNT: usize = 11;

    /// Every step, in order
    pub const ALL: [Self; Self::COUNT] = [
        Self::Load,
        Self::Check,
        Self::Fork,
        Self::Clone,
        Self::Configure,
        Self::Branch,
        Self::Feature,
        Self::Write,
        Self::Commit,
        Self::Push,
        Self::PullRequest,
    ];

    /// Wire name of the step
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Check => "check",
            Self::Fork => "fork",
            Self::Clone => "clone",
            Self::Configure => "configure",
            Self::Branch => "branch",
            Self::Feature => "feature",
            Self::Write => "write",
            Self::Commit => "commit",
            Self::Push => "push",
            Self::PullRequest => "pullrequest",
        }
    }

    /// Position in [`Step::ALL`]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Failure category for errors raised while this step runs
    pub const fn failure_kind(self) -> FailureKind {
        match self {
            Self::Load | Self::Check => FailureKind::Validation,
            Self::Fork | Self::Clone | Self::Configure => FailureKind::RepositoryPrep,
            Self::Branch | Self::Feature | Self::Write | Self::Commit | Self::Push => {
                FailureKind::GitOperation
            }
            Self::PullRequest => FailureKind::PullRequest,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Step {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| Error::Parse(format!("unknown submission step: {s}")))
    }
}

/// Per-step completion flags of one submission
///
/// Steps complete strictly in order: a step can only be marked once every
/// step before it is complete, and is never cleared afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmissionState {
    completed: [bool; Step::COUNT],
}

impl SubmissionState {
    /// Whether `step` has completed
    pub const fn is_complete(&self, step: Step) -> bool {
        self.completed[step.index()]
    }

    /// Mark `step` complete
    pub fn mark(&mut self, step: Step) -> Result<()> {
        if let Some(pending) = self.first_incomplete().filter(|p| *p < step) {
            return Err(Error::Internal(format!(
                "step {step} completed before {pending}"
            )));
        }
        self.completed[step.index()] = true;
        Ok(())
    }

    /// First step not yet complete
    pub fn first_incomplete(&self) -> Option<Step> {
        Step::ALL.into_iter().find(|s| !self.is_complete(*s))
    }

    /// Whether every step has completed
    pub fn all_complete(&self) -> bool {
        self.completed.iter().all(|c| *c)
    }

    /// Whether completion follows step order (no gaps)
    pub fn is_ordered(&self) -> bool {
        self.completed.windows(2).all(|w| w[0] || !w[1])
    }

    /// Iterate `(step, complete)` pairs in step order
    pub fn iter(&self) -> impl Iterator<Item = (Step, bool)> + '_ {
        Step::ALL.into_iter().map(|s| (s, self.is_complete(s)))
    }
}

impl Serialize for SubmissionState {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Step::COUNT))?;
        for (step, done) in self.iter() {
            map.serialize_entry(step.as_str(), &done)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SubmissionState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = HashMap::<String, bool>::deserialize(deserializer)?;
        let mut state = Self::default();
        for (name, done) in raw {
            let step = name.parse::<Step>().map_err(D::Error::custom)?;
            state.completed[step.index()] = done;
        }
        if !state.is_ordered() {
            return Err(D::Error::custom("submission steps completed out of order"));
        }
        Ok(state)
    }
}

/// Outcome of one submission, or its progress while it runs
///
/// A finished submission has `result == true` with a `url` and every step
/// complete, or `result == false` with a `message`. An in-progress snapshot
/// has neither `url` nor `message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    /// Whether the pull request was created
    pub result: bool,
    /// Pull request URL (success only)
    pub url: Option<String>,
    /// Human-readable failure message
    pub message: Option<String>,
    /// Step flags at termination
    pub state: SubmissionState,
    /// Failure category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<FailureKind>,
}

impl SubmissionResult {
    /// Successful submission
    pub const fn succeeded(url: String, state: SubmissionState) -> Self {
        Self {
            result: true,
            url: Some(url),
            message: None,
            state,
            error: None,
        }
    }

    /// Failed submission; the failing step classifies plumbing errors
    pub fn failed(err: &Error, state: SubmissionState) -> Self {
        let fallback = state.first_incomplete().unwrap_or(Step::PullRequest);
        Self {
            result: false,
            url: None,
            message: Some(err.to_string()),
            state,
            error: Some(err.kind().unwrap_or_else(|| fallback.failure_kind())),
        }
    }

    /// Snapshot of a submission still running
    pub const fn in_progress(state: SubmissionState) -> Self {
        Self {
            result: false,
            url: None,
            message: None,
            state,
            error: None,
        }
    }

    /// Whether this is a terminal outcome
    pub const fn is_finished(&self) -> bool {
        self.result || self.message.is_some()
    }
}

/// OAuth credentials for the hosting provider
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Bearer token
    pub token: String,
    /// Granted scopes
    pub scopes: Vec<String>,
    /// Token type reported by the provider
    pub token_type: String,
    /// Whether an exchange has succeeded
    pub authenticated: bool,
}

impl Credentials {
    /// Credentials produced by a successful exchange
    pub fn authenticated(token: String, scopes: Vec<String>, token_type: String) -> Self {
        Self {
            token,
            scopes,
            token_type,
            authenticated: true,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("scopes", &self.scopes)
            .field("token_type", &self.token_type)
            .field("authenticated", &self.authenticated)
            .finish()
    }
}

/// An `owner/name` repository reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoSpec {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepoSpec {
    /// Create a reference
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Authenticated account on the hosting provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Login name
    pub login: String,
    /// Numeric account id
    pub id: u64,
}

impl Identity {
    /// Commit email that GitHub attributes to this account
    pub fn noreply_email(&self) -> String {
        format!("{}+{}@users.noreply.github.com", self.id, self.login)
    }
}

/// Repository metadata returned by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryInfo {
    /// Owner and name
    pub spec: RepoSpec,
    /// HTTPS clone URL
    pub clone_url: String,
    /// Default branch name
    pub default_branch: String,
}

/// A pull request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// Web URL for the PR
    pub html_url: String,
    /// Base branch name
    pub base_ref: String,
    /// Head branch name
    pub head_ref: String,
    /// PR title
    pub title: String,
}

/// An upstream repository being prepared for one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryHandle {
    /// Upstream repository the PR targets; its default branch is the PR base
    pub upstream: RepositoryInfo,
    /// Fork under the submitter's account
    pub fork: RepositoryInfo,
    /// Local working copy, once cloned
    pub local_path: Option<PathBuf>,
}

/// A feature branch created for one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureBranch {
    /// Branch name
    pub name: String,
    /// Feature file, relative to the working copy root
    pub file_path: PathBuf,
}
