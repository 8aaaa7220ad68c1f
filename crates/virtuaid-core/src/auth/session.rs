use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde_json::Value;
use tracing::debug;

use crate::api::{ApiClient, ApiError, AuthBackend};
use crate::config::Config;
use crate::models::Credential;

use super::login::LoginError;
use super::preference::PERSIST_KEY;
use super::{
    login, logout, refresh_with_timeout, CredentialStore, KeyringMarkerStore, PreferenceStore,
    RouteGuard,
};

/// Owner of the auth context for one application run.
///
/// Holds the credential store, the durable preferences, and the backend.
/// Everything that needs to know who is signed in gets it from here.
pub struct Session {
    credentials: CredentialStore,
    preferences: PreferenceStore,
    backend: Arc<dyn AuthBackend>,
    reauth_timeout: Option<Duration>,
}

impl Session {
    pub fn new(backend: Arc<dyn AuthBackend>, preferences: PreferenceStore) -> Self {
        Self {
            credentials: CredentialStore::new(),
            preferences,
            backend,
            reauth_timeout: None,
        }
    }

    /// Session against the configured backend, with the session marker in
    /// the OS keychain and preferences in the config directory.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = ApiClient::new(config, Arc::new(KeyringMarkerStore::new()))?;
        Ok(Self::new(Arc::new(client), PreferenceStore::open_default())
            .with_reauth_timeout(config.reauth_timeout()))
    }

    pub fn with_reauth_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.reauth_timeout = timeout;
        self
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn current(&self) -> Credential {
        self.credentials.get()
    }

    /// The "keep me logged in" preference
    pub fn persist(&self) -> bool {
        self.preferences.read(PERSIST_KEY, false)
    }

    pub fn set_persist(&self, persist: bool) {
        self.preferences.write(PERSIST_KEY, persist);
    }

    /// Guard for a protected destination. The preference is read once, here.
    pub fn guard(&self, destination: &str) -> RouteGuard {
        RouteGuard::new(
            self.credentials.clone(),
            Arc::clone(&self.backend),
            self.persist(),
            destination,
        )
        .with_timeout(self.reauth_timeout)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Credential, LoginError> {
        login(self.backend.as_ref(), &self.credentials, email, password).await
    }

    pub async fn logout(&self) {
        logout(self.backend.as_ref(), &self.credentials).await;
    }

    /// Authorized GET. A rejected access token is refreshed once and the
    /// request retried with the new one.
    pub async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        let token = self.credentials.access_token().ok_or(ApiError::Unauthorized)?;

        match self.backend.get_json(path, &token).await {
            Err(e) if e.is_auth_rejection() => {
                debug!(path, error = %e, "Access token rejected, refreshing");
                let fresh =
                    refresh_with_timeout(self.backend.as_ref(), &self.credentials, self.reauth_timeout)
                        .await?;
                self.backend.get_json(path, &fresh).await
            }
            other => other,
        }
    }
}
