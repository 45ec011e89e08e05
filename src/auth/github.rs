//! GitHub OAuth token exchange

use crate::auth::TokenExchange;
use crate::error::{Error, Result};
use crate::types::Credentials;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Authorization page under a GitHub web root
pub fn authorize_url(github_url: &Url) -> Result<Url> {
    github_url
        .join("login/oauth/authorize")
        .map_err(|e| Error::Config(format!("invalid GitHub URL {github_url}: {e}")))
}

/// Token endpoint under a GitHub web root
pub fn token_url(github_url: &Url) -> Result<Url> {
    github_url
        .join("login/oauth/access_token")
        .map_err(|e| Error::Config(format!("invalid GitHub URL {github_url}: {e}")))
}

/// Body of GitHub's token endpoint response
///
/// GitHub reports exchange failures with HTTP 200 and an `error` field, so
/// every field is optional.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    scope: Option<String>,
    token_type: Option<String>,
    message: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl TokenResponse {
    fn failure_message(&self) -> Option<String> {
        self.message
            .clone()
            .or_else(|| self.error_description.clone())
            .or_else(|| self.error.clone())
    }
}

/// Network exchange against GitHub's OAuth token endpoint
pub struct GitHubTokenExchange {
    client: Client,
    token_url: Url,
    client_id: String,
    client_secret: String,
}

impl GitHubTokenExchange {
    /// Create an exchange with a bounded request timeout
    pub fn new(
        token_url: Url,
        client_id: String,
        client_secret: String,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::AuthExchange(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            token_url,
            client_id,
            client_secret,
        })
    }
}

#[async_trait]
impl TokenExchange for GitHubTokenExchange {
    async fn exchange(&self, code: Option<&str>) -> Result<Credentials> {
        let code = code
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| Error::AuthExchange("missing authorization code".to_string()))?;

        debug!(endpoint = %self.token_url, "exchanging authorization code");
        let response = self
            .client
            .post(self.token_url.clone())
            .header(ACCEPT, "application/json")
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
            ])
            .send()
            .await
            .map_err(|e| Error::AuthExchange(format!("token request failed: {e}")))?;

        let status = response.status();
        let body: Option<TokenResponse> = response.json().await.ok();

        if !status.is_success() {
            let message = body
                .as_ref()
                .and_then(TokenResponse::failure_message)
                .unwrap_or_else(|| format!("token endpoint returned {status}"));
            return Err(Error::AuthExchange(message));
        }

        let body = body.ok_or_else(|| {
            Error::AuthExchange("token endpoint returned a malformed body".to_string())
        })?;

        match body.access_token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => Ok(Credentials::authenticated(
                token.to_string(),
                parse_scopes(body.scope.as_deref().unwrap_or_default()),
                body.token_type.clone().unwrap_or_else(|| "bearer".to_string()),
            )),
            None => Err(Error::AuthExchange(body.failure_message().unwrap_or_else(
                || "response did not contain an access token".to_string(),
            ))),
        }
    }
}

/// Split GitHub's comma-separated scope list
fn parse_scopes(scope: &str) -> Vec<String> {
    scope
        .split([',', ' '])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}
