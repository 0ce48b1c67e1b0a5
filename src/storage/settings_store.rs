use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::domain::Settings;

use super::StorageError;

/// Name of the settings record inside the data directory.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Durable key/value persistence for the mounted ledger path and the timezone preference.
///
/// The store holds no cached state: every `load` goes back to disk, so all
/// components sharing a store see the same, latest record.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Create a store backed by the given settings file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a store using the well-known settings file inside `data_dir`.
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(SETTINGS_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted record. A missing, unreadable or corrupt record
    /// degrades to empty defaults instead of failing.
    pub fn load(&self) -> Settings {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no settings record yet");
                return Settings::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "settings unreadable, using defaults");
                return Settings::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "settings corrupt, using defaults");
                Settings::default()
            }
        }
    }

    /// Overwrite the whole record.
    pub fn save(&self, settings: &Settings) -> Result<(), StorageError> {
        let failure = |source| StorageError::SettingsWriteFailure {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(failure)?;
            }
        }

        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| failure(std::io::Error::other(e)))?;
        fs::write(&self.path, json).map_err(failure)?;

        debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }

    /// Read-modify-write the whole record, returning what was saved.
    pub fn update<F>(&self, f: F) -> Result<Settings, StorageError>
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = self.load();
        f(&mut settings);
        self.save(&settings)?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_returns_defaults() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::in_dir(dir.path());
        assert_eq!(store.load(), Settings::default());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_load_corrupt_returns_defaults() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::in_dir(dir.path());
        fs::write(store.path(), "{ this is not json").unwrap();
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn test_load_wrong_shape_returns_defaults() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::in_dir(dir.path());
        fs::write(store.path(), r#"{"imported_file": 42}"#).unwrap();
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::in_dir(dir.path());
        let settings = Settings {
            imported_file: "ledger.txt".to_string(),
            time: Some("UTC+2".to_string()),
        };

        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn test_save_overwrites_wholesale() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::in_dir(dir.path());
        store
            .save(&Settings {
                imported_file: "a.txt".to_string(),
                time: Some("UTC-1".to_string()),
            })
            .unwrap();

        store.save(&Settings::default()).unwrap();
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn test_save_creates_data_dir() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::in_dir(dir.path().join("nested").join("data"));
        store.save(&Settings::default()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_update_preserves_other_keys() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::in_dir(dir.path());
        store
            .update(|s| s.time = Some("UTC+5".to_string()))
            .unwrap();
        let saved = store
            .update(|s| s.imported_file = "ledger.txt".to_string())
            .unwrap();

        assert_eq!(saved.time.as_deref(), Some("UTC+5"));
        assert_eq!(store.load(), saved);
    }
}
