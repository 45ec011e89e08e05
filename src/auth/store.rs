//! Process-wide credential store

use crate::types::Credentials;
use std::sync::{PoisonError, RwLock};

/// Holds the current credentials; replaced whole, last writer wins
#[derive(Debug, Default)]
pub struct CredentialStore {
    inner: RwLock<Credentials>,
}

impl CredentialStore {
    /// Empty, unauthenticated store
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current credentials
    pub fn snapshot(&self) -> Credentials {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the stored credentials
    pub fn replace(&self, credentials: Credentials) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = credentials;
    }

    /// Whether a successful exchange has been stored
    pub fn is_authenticated(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .authenticated
    }
}
