//! `git` executable backend

use crate::error::{Error, Result};
use crate::repo::{CommitIdentity, GitAuth, GitBackend};
use async_trait::async_trait;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Runs git as a child process, one bounded invocation per operation
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
    timeout: Duration,
}

impl GitCli {
    /// Use `program` with a per-invocation `timeout`
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Run git, returning trimmed stdout
    ///
    /// The child is killed if it outlives the timeout.
    async fn run<I, S>(&self, repo: Option<&Path>, auth: Option<&GitAuth>, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<OsString> = args.into_iter().map(|a| a.as_ref().to_owned()).collect();
        let what = format!(
            "git {}",
            args.first().map(|a| a.to_string_lossy()).unwrap_or_default()
        );

        let mut cmd = Command::new(&self.program);
        if let Some(dir) = repo {
            cmd.arg("-C").arg(dir);
        }
        if let Some(auth) = auth {
            cmd.arg("-c").arg(format!("http.extraHeader={}", auth.header()));
        }
        cmd.args(&args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .kill_on_drop(true);

        debug!(command = %what, repo = ?repo, "running git");
        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| Error::Timeout(what.clone(), self.timeout))?
            .map_err(|e| Error::GitOperation(format!("failed to run {what}: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(Error::GitOperation(format!("{what} failed: {stderr}")));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl GitBackend for GitCli {
    async fn clone_repo(&self, url: &str, dest: &Path, auth: &GitAuth) -> Result<()> {
        self.run(
            None,
            Some(auth),
            [OsStr::new("clone"), OsStr::new(url), dest.as_os_str()],
        )
        .await?;
        Ok(())
    }

    async fn fetch(&self, repo: &Path, remote: &str, auth: &GitAuth) -> Result<()> {
        self.run(Some(repo), Some(auth), ["fetch", "--prune", remote])
            .await?;
        Ok(())
    }

    async fn fast_forward(&self, repo: &Path, remote: &str, branch: &str) -> Result<()> {
        let tracking = format!("{remote}/{branch}");
        // Leftovers of an interrupted submission must not ride along.
        self.run(Some(repo), None, ["reset", "--hard"]).await?;
        self.run(Some(repo), None, ["clean", "-fd"]).await?;
        self.run(Some(repo), None, ["checkout", branch]).await?;
        self.run(Some(repo), None, ["merge", "--ff-only", tracking.as_str()])
            .await?;
        Ok(())
    }

    async fn configure(
        &self,
        repo: &Path,
        identity: &CommitIdentity,
        origin_url: &str,
        upstream_url: &str,
    ) -> Result<()> {
        let settings = [
            ("user.name", identity.name.as_str()),
            ("user.email", identity.email.as_str()),
            ("remote.origin.url", origin_url),
            ("remote.upstream.url", upstream_url),
            (
                "remote.upstream.fetch",
                "+refs/heads/*:refs/remotes/upstream/*",
            ),
        ];
        for (key, value) in settings {
            self.run(Some(repo), None, ["config", key, value]).await?;
        }
        Ok(())
    }

    async fn create_branch(&self, repo: &Path, branch: &str, start_point: &str) -> Result<()> {
        self.run(Some(repo), None, ["checkout", "-b", branch, start_point])
            .await?;
        Ok(())
    }

    async fn commit(&self, repo: &Path, paths: &[PathBuf], message: &str) -> Result<()> {
        let add = [OsStr::new("add"), OsStr::new("--")]
            .into_iter()
            .chain(paths.iter().map(|p| p.as_os_str()));
        self.run(Some(repo), None, add).await?;

        let commit = [
            OsStr::new("commit"),
            OsStr::new("-m"),
            OsStr::new(message),
            OsStr::new("--only"),
            OsStr::new("--"),
        ]
        .into_iter()
        .chain(paths.iter().map(|p| p.as_os_str()));
        self.run(Some(repo), None, commit).await?;
        Ok(())
    }

    async fn push(&self, repo: &Path, remote: &str, branch: &str, auth: &GitAuth) -> Result<()> {
        self.run(
            Some(repo),
            Some(auth),
            ["push", "--set-upstream", remote, branch],
        )
        .await?;
        Ok(())
    }
}
