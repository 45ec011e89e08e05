//! Debug-mode token exchange

use crate::auth::{SCOPES, TokenExchange};
use crate::error::Result;
use crate::types::Credentials;
use async_trait::async_trait;

/// Exchange that skips the network and returns a pre-supplied token
///
/// The credentials have the same shape as a real exchange: the requested
/// scopes, a `bearer` token type and the authenticated flag set.
pub struct StaticTokenExchange {
    token: String,
}

impl StaticTokenExchange {
    /// Wrap a token
    pub const fn new(token: String) -> Self {
        Self { token }
    }
}

#[async_trait]
impl TokenExchange for StaticTokenExchange {
    async fn exchange(&self, _code: Option<&str>) -> Result<Credentials> {
        Ok(Credentials::authenticated(
            self.token.clone(),
            SCOPES.iter().map(ToString::to_string).collect(),
            "bearer".to_string(),
        ))
    }
}
