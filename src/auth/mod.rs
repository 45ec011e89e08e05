//! OAuth authentication with GitHub
//!
//! Drives the authorize-redirect / callback-code / token-exchange handshake
//! and keeps the resulting credentials in a process-wide store. The
//! exchange itself is a strategy: the network exchange against GitHub, or
//! a pre-supplied token in debug mode.

mod debug;
mod github;
mod store;

pub use debug::StaticTokenExchange;
pub use github::{GitHubTokenExchange, authorize_url, token_url};
pub use store::CredentialStore;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::Credentials;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

/// Scopes requested from GitHub
pub const SCOPES: [&str; 2] = ["repo", "gist"];

/// Strategy that turns an authorization code into credentials
#[async_trait]
pub trait TokenExchange: Send + Sync {
    /// Exchange `code` for credentials
    async fn exchange(&self, code: Option<&str>) -> Result<Credentials>;
}

/// The OAuth flow as seen by the server
pub struct OAuthExchange {
    client_id: String,
    authorize_endpoint: Url,
    redirect_uri: Url,
    strategy: Arc<dyn TokenExchange>,
    store: Arc<CredentialStore>,
}

impl OAuthExchange {
    /// Create a flow around an explicit exchange strategy
    pub fn new(
        client_id: String,
        authorize_endpoint: Url,
        redirect_uri: Url,
        strategy: Arc<dyn TokenExchange>,
        store: Arc<CredentialStore>,
    ) -> Self {
        Self {
            client_id,
            authorize_endpoint,
            redirect_uri,
            strategy,
            store,
        }
    }

    /// Create the flow selected by configuration
    ///
    /// Debug mode with a token available uses [`StaticTokenExchange`];
    /// otherwise GitHub client credentials are required.
    pub fn from_config(config: &Config, store: Arc<CredentialStore>) -> Result<Self> {
        let strategy: Arc<dyn TokenExchange> = match (config.debug, &config.debug_token) {
            (true, Some(token)) => {
                info!("debug mode: token exchange bypassed with a pre-supplied token");
                Arc::new(StaticTokenExchange::new(token.clone()))
            }
            _ => {
                let (Some(id), Some(secret)) = (&config.client_id, &config.client_secret) else {
                    return Err(Error::Config(
                        "ASSEMBLE_GITHUB_CLIENT_ID and ASSEMBLE_GITHUB_CLIENT_SECRET are required"
                            .to_string(),
                    ));
                };
                Arc::new(GitHubTokenExchange::new(
                    token_url(&config.github_url)?,
                    id.clone(),
                    secret.clone(),
                    config.remote_timeout,
                )?)
            }
        };

        Ok(Self::new(
            config.client_id.clone().unwrap_or_default(),
            authorize_url(&config.github_url)?,
            config.callback_url.clone(),
            strategy,
            store,
        ))
    }

    /// Provider URL the user is redirected to
    pub fn build_authorize_redirect(&self) -> Url {
        let mut url = self.authorize_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", self.redirect_uri.as_str())
            .append_pair("scope", &SCOPES.join(" "));
        url
    }

    /// Exchange a callback code and store the credentials
    ///
    /// A failed exchange leaves previously stored credentials untouched.
    pub async fn exchange_code_for_token(&self, code: Option<&str>) -> Result<Credentials> {
        match self.strategy.exchange(code).await {
            Ok(credentials) => {
                self.store.replace(credentials.clone());
                info!(scopes = ?credentials.scopes, "authenticated with GitHub");
                Ok(credentials)
            }
            Err(e) => {
                warn!(error = %e, "token exchange failed");
                Err(e)
            }
        }
    }

    /// Whether an exchange has succeeded in this process
    pub fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }

    /// Credential store backing this flow
    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }
}
