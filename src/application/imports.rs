use std::path::{Path, PathBuf};

use tracing::info;

use crate::storage::{LedgerFile, SettingsStore};

use super::AppError;

/// Lets the host ask the user for a ledger path (a file picker, a prompt, ...).
pub trait FilePrompt {
    /// The chosen path, or `None` if the user cancelled.
    fn choose(&mut self) -> Option<PathBuf>;
}

/// The ledger currently designated as active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountedFile {
    pub path: PathBuf,
}

impl MountedFile {
    pub fn ledger(&self) -> LedgerFile {
        LedgerFile::new(&self.path)
    }
}

/// Mounts and dismounts the ledger file.
///
/// The settings record is the only place the mounted path lives; every call
/// re-reads it, so there is no in-memory copy to drift out of date.
#[derive(Debug, Clone)]
pub struct ImportManager {
    settings: SettingsStore,
}

impl ImportManager {
    pub fn new(settings: SettingsStore) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Designate `path` as the active ledger, creating it empty if missing.
    /// Mounting the already-mounted path just persists the same value again.
    pub fn mount(&self, path: impl AsRef<Path>) -> Result<MountedFile, AppError> {
        let path = path.as_ref();
        LedgerFile::new(path).ensure_exists()?;

        let imported_file = path.to_string_lossy().into_owned();
        self.settings
            .update(|settings| settings.imported_file = imported_file)?;

        info!(path = %path.display(), "ledger mounted");
        Ok(MountedFile {
            path: path.to_path_buf(),
        })
    }

    /// Ask the host for a path and mount it. A cancelled prompt changes nothing.
    pub fn mount_with<P>(&self, prompt: &mut P) -> Result<Option<MountedFile>, AppError>
    where
        P: FilePrompt + ?Sized,
    {
        match prompt.choose() {
            Some(path) => self.mount(path).map(Some),
            None => Ok(None),
        }
    }

    /// Forget the active ledger. The key is kept with an empty value; the file
    /// itself is untouched.
    pub fn dismount(&self) -> Result<(), AppError> {
        let mut settings = self.settings.load();
        let Some(previous) = settings.mounted_path().map(str::to_string) else {
            return Ok(());
        };

        settings.imported_file.clear();
        self.settings.save(&settings)?;

        info!(path = %previous, "ledger dismounted");
        Ok(())
    }

    /// The mounted ledger path, if any.
    pub fn current(&self) -> Option<PathBuf> {
        self.settings.load().mounted_path().map(PathBuf::from)
    }

    pub fn current_file(&self) -> Option<MountedFile> {
        self.current().map(|path| MountedFile { path })
    }
}
