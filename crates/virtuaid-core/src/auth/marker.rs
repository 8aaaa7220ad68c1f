//! Storage for the durable session marker (the refresh cookie).

use std::sync::Mutex;

use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "virtuaid-admin";

/// Keychain account the marker is filed under
const DEFAULT_ACCOUNT: &str = "session-marker";

/// A cookie jar with room for exactly one cookie.
pub trait MarkerStore: Send + Sync {
    fn load(&self) -> Result<Option<String>>;
    fn store(&self, marker: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Marker kept in the OS keychain so it survives restarts.
pub struct KeyringMarkerStore {
    account: String,
}

impl KeyringMarkerStore {
    pub fn new() -> Self {
        Self::for_account(DEFAULT_ACCOUNT)
    }

    pub fn for_account(account: &str) -> Self {
        Self {
            account: account.to_string(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(SERVICE_NAME, &self.account).context("Failed to create keyring entry")
    }
}

impl Default for KeyringMarkerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkerStore for KeyringMarkerStore {
    fn load(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(marker) => Ok(Some(marker)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to read session marker from keychain"),
        }
    }

    fn store(&self, marker: &str) -> Result<()> {
        self.entry()?
            .set_password(marker)
            .context("Failed to store session marker in keychain")
    }

    fn clear(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete session marker from keychain"),
        }
    }
}

/// Marker that lives only as long as the process.
#[derive(Default)]
pub struct MemoryMarkerStore {
    marker: Mutex<Option<String>>,
}

impl MemoryMarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_marker(marker: &str) -> Self {
        Self {
            marker: Mutex::new(Some(marker.to_string())),
        }
    }
}

impl MarkerStore for MemoryMarkerStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self
            .marker
            .lock()
            .map_err(|_| anyhow::anyhow!("Session marker lock poisoned"))?
            .clone())
    }

    fn store(&self, marker: &str) -> Result<()> {
        *self
            .marker
            .lock()
            .map_err(|_| anyhow::anyhow!("Session marker lock poisoned"))? = Some(marker.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self
            .marker
            .lock()
            .map_err(|_| anyhow::anyhow!("Session marker lock poisoned"))? = None;
        Ok(())
    }
}
