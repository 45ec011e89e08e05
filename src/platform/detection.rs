//! Repository reference parsing

use crate::error::{Error, Result};
use crate::types::RepoSpec;
use regex::Regex;

/// Parse an upstream repository reference
///
/// Accepts `owner/repo`, `https://host/owner/repo(.git)` and
/// `git@host:owner/repo(.git)`.
pub fn parse_repo_spec(input: &str) -> Result<RepoSpec> {
    let input = input.trim().trim_end_matches('/');

    let re_ssh = Regex::new(r"^git@[^:]+:(.+?)(?:\.git)?$")
        .map_err(|e| Error::Internal(e.to_string()))?;
    let re_https = Regex::new(r"^https?://[^/]+/(.+?)(?:\.git)?$")
        .map_err(|e| Error::Internal(e.to_string()))?;

    let path = re_ssh
        .captures(input)
        .or_else(|| re_https.captures(input))
        .and_then(|c| c.get(1))
        .map_or(input, |m| m.as_str());

    let parts: Vec<&str> = path.split('/').collect();
    match parts.as_slice() {
        [owner, repo] if valid_segment(owner) && valid_segment(repo) => {
            Ok(RepoSpec::new(*owner, *repo))
        }
        _ => Err(Error::Parse(format!("invalid repository reference: {input}"))),
    }
}

fn valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
