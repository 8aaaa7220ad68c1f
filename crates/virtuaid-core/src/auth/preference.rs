//! Durable user preferences, the console's equivalent of browser local storage.
//!
//! Values live as JSON in a single file. Reads never fail: anything missing,
//! unreadable or of the wrong type yields the caller's default.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;

/// Key of the "keep me logged in" preference
pub const PERSIST_KEY: &str = "persist";

#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: Option<PathBuf>,
}

impl PreferenceStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// Store in the user's config directory, or an unavailable store when
    /// there is no such directory.
    pub fn open_default() -> Self {
        match Config::preferences_path() {
            Ok(path) => Self::new(path),
            Err(e) => {
                warn!(error = %e, "No durable preference location, using defaults");
                Self::unavailable()
            }
        }
    }

    /// A store with nowhere to persist: reads return defaults, writes are dropped.
    pub fn unavailable() -> Self {
        Self { path: None }
    }

    pub fn read(&self, key: &str, default: bool) -> bool {
        let Some(ref path) = self.path else {
            return default;
        };

        match Self::load(path) {
            Ok(values) => match values.get(key) {
                Some(Value::Bool(value)) => *value,
                Some(other) => {
                    debug!(key, value = %other, "Preference is not a boolean, using default");
                    default
                }
                None => default,
            },
            Err(e) => {
                warn!(key, error = %e, "Failed to read preferences, using default");
                default
            }
        }
    }

    pub fn write(&self, key: &str, value: bool) {
        let Some(ref path) = self.path else {
            debug!(key, "Preference store unavailable, dropping write");
            return;
        };

        if let Err(e) = Self::store(path, key, value) {
            warn!(key, error = %e, "Failed to write preference");
        }
    }

    fn load(path: &Path) -> Result<BTreeMap<String, Value>> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(path).context("Failed to read preference file")?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents).context("Failed to parse preference file")
    }

    fn store(path: &Path, key: &str, value: bool) -> Result<()> {
        // A corrupt file is replaced rather than blocking the write
        let mut values = Self::load(path).unwrap_or_default();
        values.insert(key.to_string(), Value::Bool(value));

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(&values)?)?;
        std::fs::rename(&tmp, path).context("Failed to replace preference file")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, PreferenceStore) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = PreferenceStore::new(dir.path().join("prefs").join("preferences.json"));
        (dir, store)
    }

    #[test]
    fn test_read_unset_returns_default() {
        let (_dir, store) = temp_store();
        assert!(!store.read(PERSIST_KEY, false));
        assert!(store.read(PERSIST_KEY, true));
    }

    #[test]
    fn test_write_then_read() {
        let (_dir, store) = temp_store();
        store.write(PERSIST_KEY, true);
        assert!(store.read(PERSIST_KEY, false));
        store.write(PERSIST_KEY, false);
        assert!(!store.read(PERSIST_KEY, true));
    }

    #[test]
    fn test_write_keeps_other_keys() {
        let (_dir, store) = temp_store();
        store.write("theme_dark", true);
        store.write(PERSIST_KEY, true);
        assert!(store.read("theme_dark", false));
        assert!(store.read(PERSIST_KEY, false));
    }

    #[test]
    fn test_last_write_wins_across_handles() {
        let (_dir, first) = temp_store();
        let second = first.clone();
        first.write(PERSIST_KEY, true);
        second.write(PERSIST_KEY, false);
        assert!(!first.read(PERSIST_KEY, true));
    }

    #[test]
    fn test_non_boolean_value_falls_back() {
        let (dir, _) = temp_store();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, r#"{"persist": "yes"}"#).unwrap();
        let store = PreferenceStore::new(path);
        assert!(!store.read(PERSIST_KEY, false));
    }

    #[test]
    fn test_corrupt_file_falls_back_and_is_repaired() {
        let (dir, _) = temp_store();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = PreferenceStore::new(path);
        assert!(store.read(PERSIST_KEY, true));

        store.write(PERSIST_KEY, true);
        assert!(store.read(PERSIST_KEY, false));
    }

    #[test]
    fn test_unavailable_store() {
        let store = PreferenceStore::unavailable();
        store.write(PERSIST_KEY, true);
        assert!(!store.read(PERSIST_KEY, false));
    }
}
