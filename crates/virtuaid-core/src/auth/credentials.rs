use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::models::Credential;

/// Holder of the current authenticated identity.
///
/// Every clone shares the same credential. The owner creates one at start-up
/// and hands clones to whatever needs to know who is signed in.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    inner: Arc<RwLock<Credential>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            inner: Arc::new(RwLock::new(credential)),
        }
    }

    // A panicked writer cannot leave a half-written credential behind, so
    // poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, Credential> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Credential> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Snapshot of the current credential (possibly empty)
    pub fn get(&self) -> Credential {
        self.read().clone()
    }

    /// Replace the credential wholesale
    pub fn set(&self, credential: Credential) {
        *self.write() = credential;
    }

    /// Replace only the access token, keeping the known identity
    pub fn merge_token(&self, access_token: &str) {
        self.write().access_token = Some(access_token.to_string());
    }

    pub fn clear(&self) {
        self.set(Credential::default());
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().access_token.clone().filter(|t| !t.is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }

    pub fn has_name(&self) -> bool {
        self.read().has_name()
    }
}
