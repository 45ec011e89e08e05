//! Server configuration from `ASSEMBLE_*` environment variables

use crate::error::{Error, Result};
use crate::platform::parse_repo_spec;
use crate::types::RepoSpec;
use std::env;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Default feature file template, relative to the working copy root
pub const DEFAULT_FEATURE_PATH: &str = "features/contrib/user_{user}/feature_{stamp}.py";

/// Default pull request title
pub const DEFAULT_PR_TITLE: &str = "Propose new feature";

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Repository submissions are proposed to
    pub upstream: RepoSpec,
    /// OAuth app client id
    pub client_id: Option<String>,
    /// OAuth app client secret
    pub client_secret: Option<String>,
    /// GitHub web root used for OAuth (always ends in `/`)
    pub github_url: Url,
    /// GitHub Enterprise API root; `None` for api.github.com
    pub api_url: Option<String>,
    /// OAuth callback address
    pub callback_url: Url,
    /// Non-interactive mode: token exchange may use `debug_token`
    pub debug: bool,
    /// Pre-supplied token for debug mode
    pub debug_token: Option<String>,
    /// Directory holding local working copies
    pub work_dir: PathBuf,
    /// Feature file template with `{user}` and `{stamp}` placeholders
    pub feature_path: String,
    /// Pull request title
    pub pr_title: String,
    /// git executable
    pub git_program: String,
    /// Bound on each remote call
    pub remote_timeout: Duration,
    /// Fork readiness polls before giving up
    pub fork_poll_attempts: u32,
    /// Delay between fork readiness polls
    pub fork_poll_interval: Duration,
    /// Listen address
    pub bind: String,
    /// Listen port
    pub port: u16,
}

/// Settings the submission pipeline needs
#[derive(Debug, Clone)]
pub struct SubmitSettings {
    /// Repository submissions are proposed to
    pub upstream: RepoSpec,
    /// Directory holding local working copies
    pub work_dir: PathBuf,
    /// Feature file template
    pub feature_path: String,
    /// Pull request title
    pub pr_title: String,
    /// Bound on each remote call
    pub remote_timeout: Duration,
    /// Fork readiness polls before giving up
    pub fork_poll_attempts: u32,
    /// Delay between fork readiness polls
    pub fork_poll_interval: Duration,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let upstream = get("ASSEMBLE_UPSTREAM")
            .ok_or_else(|| Error::Config("ASSEMBLE_UPSTREAM is required".to_string()))
            .and_then(|v| parse_repo_spec(&v))?;

        let bind = get("ASSEMBLE_BIND").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_or(get("ASSEMBLE_PORT"), "ASSEMBLE_PORT", 8888_u16)?;

        let github_url = parse_url(
            &get("ASSEMBLE_GITHUB_URL").unwrap_or_else(|| "https://github.com/".to_string()),
            "ASSEMBLE_GITHUB_URL",
        )?;
        let github_url = with_trailing_slash(github_url);

        let callback_url = parse_url(
            &get("ASSEMBLE_CALLBACK_URL")
                .unwrap_or_else(|| format!("http://{bind}:{port}/assemble/auth/token")),
            "ASSEMBLE_CALLBACK_URL",
        )?;

        let debug = parse_or(get("ASSEMBLE_DEBUG"), "ASSEMBLE_DEBUG", false)?;
        let debug_token = get("ASSEMBLE_DEBUG_TOKEN")
            .or_else(|| get("GITHUB_TOKEN"))
            .or_else(|| get("GH_TOKEN"))
            .map(|t| t.trim().to_string());

        let work_dir = get("ASSEMBLE_WORK_DIR")
            .map_or_else(default_work_dir, PathBuf::from);

        let feature_path =
            get("ASSEMBLE_FEATURE_PATH").unwrap_or_else(|| DEFAULT_FEATURE_PATH.to_string());
        validate_feature_path(&feature_path)?;

        let remote_timeout = Duration::from_secs(parse_or(
            get("ASSEMBLE_REMOTE_TIMEOUT_SECS"),
            "ASSEMBLE_REMOTE_TIMEOUT_SECS",
            60_u64,
        )?);
        if remote_timeout.is_zero() {
            return Err(Error::Config(
                "ASSEMBLE_REMOTE_TIMEOUT_SECS must be positive".to_string(),
            ));
        }

        Ok(Self {
            upstream,
            client_id: get("ASSEMBLE_GITHUB_CLIENT_ID"),
            client_secret: get("ASSEMBLE_GITHUB_CLIENT_SECRET"),
            github_url,
            api_url: get("ASSEMBLE_GITHUB_API_URL"),
            callback_url,
            debug,
            debug_token,
            work_dir,
            feature_path,
            pr_title: get("ASSEMBLE_PR_TITLE").unwrap_or_else(|| DEFAULT_PR_TITLE.to_string()),
            git_program: get("ASSEMBLE_GIT").unwrap_or_else(|| "git".to_string()),
            remote_timeout,
            fork_poll_attempts: parse_or(
                get("ASSEMBLE_FORK_POLL_ATTEMPTS"),
                "ASSEMBLE_FORK_POLL_ATTEMPTS",
                10_u32,
            )?,
            fork_poll_interval: Duration::from_millis(parse_or(
                get("ASSEMBLE_FORK_POLL_INTERVAL_MS"),
                "ASSEMBLE_FORK_POLL_INTERVAL_MS",
                2000_u64,
            )?),
            bind,
            port,
        })
    }

    /// Settings for the submission pipeline
    pub fn submit_settings(&self) -> SubmitSettings {
        SubmitSettings {
            upstream: self.upstream.clone(),
            work_dir: self.work_dir.clone(),
            feature_path: self.feature_path.clone(),
            pr_title: self.pr_title.clone(),
            remote_timeout: self.remote_timeout,
            fork_poll_attempts: self.fork_poll_attempts,
            fork_poll_interval: self.fork_poll_interval,
        }
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, key: &str, default: T) -> Result<T> {
    value.map_or(Ok(default), |v| {
        v.trim()
            .parse()
            .map_err(|_| Error::Config(format!("{key} has an invalid value: {v}")))
    })
}

fn parse_url(value: &str, key: &str) -> Result<Url> {
    Url::parse(value).map_err(|e| Error::Config(format!("{key} is not a valid URL: {e}")))
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn default_work_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join("assemble")
        .join("repos")
}

/// Reject templates that could escape the working copy
fn validate_feature_path(template: &str) -> Result<()> {
    let path = Path::new(template);
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if template.is_empty() || escapes {
        return Err(Error::Config(format!(
            "ASSEMBLE_FEATURE_PATH must be a relative path inside the repository: {template}"
        )));
    }
    Ok(())
}
