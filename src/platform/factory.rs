//! Platform service factory
//!
//! Connects platform services for the credentials held by the server.

use crate::error::Result;
use crate::platform::{GitHubService, PlatformService};
use crate::types::Credentials;
use std::sync::Arc;

/// Builds a platform service bound to a set of credentials
pub trait PlatformFactory: Send + Sync {
    /// Connect a service authenticated with `credentials`
    fn connect(&self, credentials: &Credentials) -> Result<Arc<dyn PlatformService>>;
}

/// Factory for github.com or a GitHub Enterprise instance
#[derive(Debug, Clone, Default)]
pub struct GitHubFactory {
    api_base: Option<String>,
}

impl GitHubFactory {
    /// Create a factory; `api_base` overrides the github.com API root
    pub const fn new(api_base: Option<String>) -> Self {
        Self { api_base }
    }
}

impl PlatformFactory for GitHubFactory {
    fn connect(&self, credentials: &Credentials) -> Result<Arc<dyn PlatformService>> {
        Ok(Arc::new(GitHubService::new(
            &credentials.token,
            self.api_base.as_deref(),
        )?))
    }
}
